//! Notification channel policy and provisioning
//!
//! The set of required channels is a pure function of the device class;
//! provisioning them is idempotent and best-effort. A descriptor that fails
//! to apply is logged and skipped — partial provisioning degrades quality
//! but never blocks registration.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::device::DeviceClass;
use crate::platform::{NotificationPlatform, PlatformError};

/// Channel ids. `urgent` only exists on the modern vendor generation.
pub const CHANNEL_DEFAULT: &str = "default";
pub const CHANNEL_MESSAGES: &str = "messages";
pub const CHANNEL_URGENT: &str = "urgent";

/// Brand accent color used for notification lights (ARGB-less RGB)
const LIGHT_COLOR: u32 = 0x2563EB;

/// Standard short buzz
const VIBRATION_SHORT_MS: [u64; 4] = [0, 250, 250, 250];
/// Longer-period pattern for the modern urgent channel — HyperOS collapses
/// short patterns into a single tick
const VIBRATION_LONG_MS: [u64; 6] = [0, 500, 250, 500, 250, 500];

// ============================================================================
// DESCRIPTOR TYPES
// ============================================================================

/// Channel importance, mapped by the bindings onto the OS importance scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelImportance {
    Low,
    Default,
    High,
    Max,
}

/// What the notification shows on the lockscreen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockscreenVisibility {
    /// Content hidden until unlocked
    Private,
    /// Full content on the lockscreen
    Public,
}

/// Full specification of one notification channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    /// Unique channel key
    pub id: String,
    /// User-visible channel name
    pub display_name: String,
    pub importance: ChannelImportance,
    /// On/off durations in milliseconds, starting with the initial delay
    pub vibration_pattern_ms: Vec<u64>,
    /// Notification LED color
    pub light_color: u32,
    pub lockscreen_visibility: LockscreenVisibility,
    /// Notifications on this channel resist swipe-dismissal
    pub sticky: bool,
}

// ============================================================================
// POLICY TABLE
// ============================================================================

/// Channels required for a device class.
///
/// | class            | default | messages | extra                        |
/// |------------------|---------|----------|------------------------------|
/// | Standard         | Max     | High     | —                            |
/// | RestrictedLegacy | Max     | High     | —                            |
/// | RestrictedModern | High    | Max      | urgent: Max, public, sticky  |
pub fn required_channels(class: DeviceClass) -> Vec<ChannelDescriptor> {
    let (default_importance, messages_importance) = match class {
        DeviceClass::Standard | DeviceClass::RestrictedLegacy => {
            (ChannelImportance::Max, ChannelImportance::High)
        }
        DeviceClass::RestrictedModern => (ChannelImportance::High, ChannelImportance::Max),
    };

    let mut channels = vec![
        ChannelDescriptor {
            id: CHANNEL_DEFAULT.to_string(),
            display_name: "default".to_string(),
            importance: default_importance,
            vibration_pattern_ms: VIBRATION_SHORT_MS.to_vec(),
            light_color: LIGHT_COLOR,
            lockscreen_visibility: LockscreenVisibility::Private,
            sticky: false,
        },
        ChannelDescriptor {
            id: CHANNEL_MESSAGES.to_string(),
            display_name: "消息通知".to_string(),
            importance: messages_importance,
            vibration_pattern_ms: VIBRATION_SHORT_MS.to_vec(),
            light_color: LIGHT_COLOR,
            lockscreen_visibility: LockscreenVisibility::Private,
            sticky: false,
        },
    ];

    if class == DeviceClass::RestrictedModern {
        channels.push(ChannelDescriptor {
            id: CHANNEL_URGENT.to_string(),
            display_name: "重要消息".to_string(),
            importance: ChannelImportance::Max,
            vibration_pattern_ms: VIBRATION_LONG_MS.to_vec(),
            light_color: LIGHT_COLOR,
            lockscreen_visibility: LockscreenVisibility::Public,
            sticky: true,
        });
    }

    channels
}

// ============================================================================
// PROVISIONER
// ============================================================================

/// Result of one provisioning pass
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    /// Descriptors successfully applied (cumulative across passes)
    pub channels: Vec<ChannelDescriptor>,
    /// Descriptor ids that failed this pass, with the platform error
    pub failures: Vec<(String, PlatformError)>,
}

impl ProvisionOutcome {
    /// True when at least one descriptor failed to apply
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Idempotently ensures the channels for a device class exist on the platform
pub struct ChannelProvisioner {
    platform: Arc<dyn NotificationPlatform>,
    provisioned: RwLock<HashMap<String, ChannelDescriptor>>,
}

impl ChannelProvisioner {
    pub fn new(platform: Arc<dyn NotificationPlatform>) -> Self {
        Self {
            platform,
            provisioned: RwLock::new(HashMap::new()),
        }
    }

    /// Apply every channel the class requires, one platform call per
    /// descriptor. Individual failures are logged and skipped; the remaining
    /// descriptors are still attempted. Re-applying an existing id updates
    /// it in place — the map insert cannot duplicate.
    pub async fn ensure_channels(&self, class: DeviceClass) -> ProvisionOutcome {
        let mut failures = Vec::new();

        for descriptor in required_channels(class) {
            match self.platform.apply_channel(&descriptor).await {
                Ok(()) => {
                    debug!(channel = %descriptor.id, ?class, "channel provisioned");
                    self.provisioned
                        .write()
                        .insert(descriptor.id.clone(), descriptor);
                }
                Err(e) => {
                    warn!(channel = %descriptor.id, error = %e, "channel provisioning failed; continuing");
                    failures.push((descriptor.id, e));
                }
            }
        }

        ProvisionOutcome {
            channels: self.provisioned.read().values().cloned().collect(),
            failures,
        }
    }

    /// Whether a channel id has been successfully applied this session
    pub fn is_provisioned(&self, id: &str) -> bool {
        self.provisioned.read().contains_key(id)
    }

    /// Snapshot of everything provisioned so far
    pub fn provisioned(&self) -> Vec<ChannelDescriptor> {
        self.provisioned.read().values().cloned().collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
