//! Vendor setup-guide selection
//!
//! Pure view logic: which instructional flow, if any, the UI should offer.
//! The step content itself lives with the screens, not here.

use serde::{Deserialize, Serialize};

use crate::device::DeviceClass;

/// Which vendor-specific instructional flow to surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideVariant {
    /// Autostart / battery-policy walkthrough for the MIUI generation
    MiuiGuide,
    /// Stricter notification-permission walkthrough for HyperOS (Android 14+)
    HyperOsGuide,
}

impl std::fmt::Display for GuideVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MiuiGuide => write!(f, "MiuiGuide"),
            Self::HyperOsGuide => write!(f, "HyperOsGuide"),
        }
    }
}

/// Select the guide for a device class. Standard devices need none.
pub fn select_guide(class: DeviceClass) -> Option<GuideVariant> {
    match class {
        DeviceClass::Standard => None,
        DeviceClass::RestrictedLegacy => Some(GuideVariant::MiuiGuide),
        DeviceClass::RestrictedModern => Some(GuideVariant::HyperOsGuide),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_has_no_guide() {
        assert_eq!(select_guide(DeviceClass::Standard), None);
    }

    #[test]
    fn test_legacy_gets_miui_guide() {
        assert_eq!(
            select_guide(DeviceClass::RestrictedLegacy),
            Some(GuideVariant::MiuiGuide)
        );
    }

    #[test]
    fn test_modern_gets_hyperos_guide() {
        assert_eq!(
            select_guide(DeviceClass::RestrictedModern),
            Some(GuideVariant::HyperOsGuide)
        );
    }

    #[test]
    fn test_variant_display() {
        assert_eq!(format!("{}", GuideVariant::MiuiGuide), "MiuiGuide");
        assert_eq!(format!("{}", GuideVariant::HyperOsGuide), "HyperOsGuide");
    }
}
