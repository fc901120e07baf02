//! Device classification for notification policy selection
//!
//! Certain vendor ROMs (MIUI and its HyperOS successor) kill backgrounded
//! processes and throttle notifications far beyond stock Android. Everything
//! downstream — channel importance, keep-alive pings, setup guides — keys off
//! the classification computed here.

use serde::{Deserialize, Serialize};

/// Vendor family names matched (case-insensitive, substring) against both
/// brand and manufacturer. Known fragile; kept deliberately narrow.
const VENDOR_FAMILIES: [&str; 2] = ["xiaomi", "redmi"];

/// OS major version at which the vendor switched to its newer platform
/// generation (HyperOS ships on Android 14).
const MODERN_OS_MAJOR: u32 = 14;

// ============================================================================
// DEVICE PROFILE
// ============================================================================

/// Immutable snapshot of device metadata, captured once per process by the
/// host bindings. Hardware does not change mid-session, so nothing here is
/// cached across restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Marketing brand string as reported by the OS (e.g. "Redmi")
    pub brand: String,
    /// Manufacturer string as reported by the OS (e.g. "Xiaomi")
    pub manufacturer: String,
    /// Raw OS version string (e.g. "14.1"); parsed best-effort
    pub os_version: String,
    /// False on emulators/simulators — push services are unavailable there
    pub is_physical_device: bool,
}

impl DeviceProfile {
    pub fn new(
        brand: impl Into<String>,
        manufacturer: impl Into<String>,
        os_version: impl Into<String>,
        is_physical_device: bool,
    ) -> Self {
        Self {
            brand: brand.into(),
            manufacturer: manufacturer.into(),
            os_version: os_version.into(),
            is_physical_device,
        }
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Notification policy class for the running device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceClass {
    /// Stock-behaving Android; no workarounds needed
    Standard,
    /// Vendor family on the older platform generation (MIUI era):
    /// aggressive background killing, standard notification surfaces
    RestrictedLegacy,
    /// Vendor family on OS >= 14 (HyperOS era): materially different
    /// notification-policy surfaces, needs a dedicated urgent channel
    RestrictedModern,
}

impl DeviceClass {
    /// True for both vendor-restricted generations
    pub fn is_restricted(&self) -> bool {
        matches!(self, Self::RestrictedLegacy | Self::RestrictedModern)
    }
}

impl std::fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "Standard"),
            Self::RestrictedLegacy => write!(f, "RestrictedLegacy"),
            Self::RestrictedModern => write!(f, "RestrictedModern"),
        }
    }
}

/// Classify a device profile. Pure and total: every profile maps to some
/// class, including simulated devices — policy selection must stay
/// deterministic for testing, so physical-device status is ignored here.
pub fn classify(profile: &DeviceProfile) -> DeviceClass {
    let brand = profile.brand.to_lowercase();
    let manufacturer = profile.manufacturer.to_lowercase();

    let vendor_match = VENDOR_FAMILIES
        .iter()
        .any(|family| brand.contains(family) || manufacturer.contains(family));

    if !vendor_match {
        return DeviceClass::Standard;
    }

    // Unparsable versions are treated as below the modern cutoff
    match parse_major_version(&profile.os_version) {
        Some(major) if major >= MODERN_OS_MAJOR => DeviceClass::RestrictedModern,
        _ => DeviceClass::RestrictedLegacy,
    }
}

/// Best-effort integer major-version prefix: "14.1" -> 14, "13" -> 13,
/// "banana" -> None.
fn parse_major_version(raw: &str) -> Option<u32> {
    let digits: String = raw.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn profile(brand: &str, manufacturer: &str, os: &str) -> DeviceProfile {
        DeviceProfile::new(brand, manufacturer, os, true)
    }

    #[test]
    fn test_unmatched_brand_is_standard() {
        assert_eq!(classify(&profile("samsung", "Samsung", "13")), DeviceClass::Standard);
        assert_eq!(classify(&profile("google", "Google", "14")), DeviceClass::Standard);
        assert_eq!(classify(&profile("", "", "")), DeviceClass::Standard);
    }

    #[test]
    fn test_xiaomi_modern() {
        assert_eq!(
            classify(&profile("xiaomi", "Xiaomi", "14.1")),
            DeviceClass::RestrictedModern
        );
    }

    #[test]
    fn test_xiaomi_legacy() {
        assert_eq!(
            classify(&profile("xiaomi", "Xiaomi", "13")),
            DeviceClass::RestrictedLegacy
        );
    }

    #[test]
    fn test_redmi_matches_family() {
        assert_eq!(
            classify(&profile("Redmi", "Xiaomi", "12.5")),
            DeviceClass::RestrictedLegacy
        );
    }

    #[test]
    fn test_manufacturer_match_alone_suffices() {
        assert_eq!(
            classify(&profile("poco", "Xiaomi", "14")),
            DeviceClass::RestrictedModern
        );
    }

    #[test]
    fn test_match_is_case_insensitive_substring() {
        assert_eq!(
            classify(&profile("XIAOMI-special", "whatever", "15.0.2")),
            DeviceClass::RestrictedModern
        );
    }

    #[test]
    fn test_unparsable_version_is_legacy() {
        assert_eq!(
            classify(&profile("xiaomi", "Xiaomi", "V816")),
            DeviceClass::RestrictedLegacy
        );
        assert_eq!(
            classify(&profile("xiaomi", "Xiaomi", "")),
            DeviceClass::RestrictedLegacy
        );
    }

    #[test]
    fn test_version_boundary() {
        assert_eq!(
            classify(&profile("redmi", "xiaomi", "13.9")),
            DeviceClass::RestrictedLegacy
        );
        assert_eq!(
            classify(&profile("redmi", "xiaomi", "14.0")),
            DeviceClass::RestrictedModern
        );
    }

    #[test]
    fn test_simulator_still_classified() {
        // Vendor-family match takes priority over physical-device status
        let p = DeviceProfile::new("xiaomi", "Xiaomi", "14", false);
        assert_eq!(classify(&p), DeviceClass::RestrictedModern);
    }

    #[test]
    fn test_parse_major_version() {
        assert_eq!(parse_major_version("14.1"), Some(14));
        assert_eq!(parse_major_version("13"), Some(13));
        assert_eq!(parse_major_version(" 12.0.1 "), Some(12));
        assert_eq!(parse_major_version("beta-14"), None);
        assert_eq!(parse_major_version(""), None);
    }

    #[test]
    fn test_is_restricted() {
        assert!(!DeviceClass::Standard.is_restricted());
        assert!(DeviceClass::RestrictedLegacy.is_restricted());
        assert!(DeviceClass::RestrictedModern.is_restricted());
    }

    #[test]
    fn test_class_display() {
        assert_eq!(format!("{}", DeviceClass::Standard), "Standard");
        assert_eq!(format!("{}", DeviceClass::RestrictedLegacy), "RestrictedLegacy");
        assert_eq!(format!("{}", DeviceClass::RestrictedModern), "RestrictedModern");
    }

    proptest! {
        #[test]
        fn prop_non_vendor_profiles_are_standard(
            brand in "[a-hj-qs-z]{0,16}",
            manufacturer in "[a-hj-qs-z]{0,16}",
            os in "[0-9]{0,3}",
        ) {
            prop_assume!(!brand.contains("xiaomi") && !brand.contains("redmi"));
            prop_assume!(!manufacturer.contains("xiaomi") && !manufacturer.contains("redmi"));
            let p = DeviceProfile::new(brand, manufacturer, os, true);
            prop_assert_eq!(classify(&p), DeviceClass::Standard);
        }

        #[test]
        fn prop_vendor_profiles_never_standard(
            os in "\\PC{0,8}",
            physical in proptest::bool::ANY,
        ) {
            let p = DeviceProfile::new("xiaomi", "other", os, physical);
            prop_assert!(classify(&p).is_restricted());
        }
    }
}
