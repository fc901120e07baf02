//! Notification composition and emission
//!
//! Two emission paths: user-facing message alerts, and low-priority
//! keep-alive pings that discourage vendor ROMs from killing the backgrounded
//! process. Both are best-effort — platform delivery failures are logged and
//! swallowed, never surfaced to the host UI. Emitting against a channel that
//! was never provisioned is different: that is a contract violation and comes
//! back as a typed error.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::channel::{ChannelProvisioner, CHANNEL_DEFAULT, CHANNEL_MESSAGES, CHANNEL_URGENT};
use crate::device::DeviceClass;
use crate::platform::NotificationPlatform;

/// Keep-alive delays observed to survive each generation's throttling
const KEEP_ALIVE_DELAY_MODERN: Duration = Duration::from_secs(60);
const KEEP_ALIVE_DELAY_LEGACY: Duration = Duration::from_secs(30);

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The target channel was never provisioned for this classification
    #[error("channel '{0}' has not been provisioned")]
    ChannelNotProvisioned(String),
}

// ============================================================================
// REQUEST TYPES
// ============================================================================

/// Per-notification priority, mapped by the bindings onto the OS scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationPriority {
    Min,
    Low,
    Default,
    High,
    Max,
}

/// One notification handed to the platform. Constructed fresh per emission
/// and never persisted here — history is the UI layer's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    /// Must reference an already-provisioned channel
    pub channel_id: String,
    pub priority: NotificationPriority,
    /// Resists swipe-dismissal when true
    pub sticky: bool,
    pub sound_enabled: bool,
    /// None fires immediately; Some defers the OS trigger
    pub delay: Option<Duration>,
    /// Free-form payload; insertion order irrelevant
    pub metadata: HashMap<String, serde_json::Value>,
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Composes and emits notification requests for one device class
pub struct NotificationScheduler {
    platform: Arc<dyn NotificationPlatform>,
    provisioner: Arc<ChannelProvisioner>,
    class: DeviceClass,
}

impl NotificationScheduler {
    pub fn new(
        platform: Arc<dyn NotificationPlatform>,
        provisioner: Arc<ChannelProvisioner>,
        class: DeviceClass,
    ) -> Self {
        Self {
            platform,
            provisioner,
            class,
        }
    }

    /// Emit a user-facing message alert, fired immediately.
    ///
    /// Modern vendor devices route to the dedicated urgent channel, sticky
    /// and at maximum priority; everything else goes to the messages channel.
    pub async fn emit_message_alert(&self, title: &str, body: &str) -> Result<(), ScheduleError> {
        let (channel_id, priority, sticky) = match self.class {
            DeviceClass::RestrictedModern => (CHANNEL_URGENT, NotificationPriority::Max, true),
            _ => (CHANNEL_MESSAGES, NotificationPriority::High, false),
        };

        let request = NotificationRequest {
            id: Uuid::new_v4(),
            title: title.to_string(),
            body: body.to_string(),
            channel_id: channel_id.to_string(),
            priority,
            sticky,
            sound_enabled: true,
            delay: None,
            metadata: HashMap::from([
                ("kind".to_string(), json!("message")),
                ("classification".to_string(), json!(self.class.to_string())),
                ("emitted_at_ms".to_string(), json!(unix_millis())),
            ]),
        };

        self.emit(request).await
    }

    /// Emit a silent keep-alive ping after a background transition.
    ///
    /// Suppressed entirely on Standard devices — there is nothing to work
    /// around and the pings would read as spam. The deferred delay and
    /// priority differ per vendor generation.
    pub async fn emit_keep_alive(&self) -> Result<(), ScheduleError> {
        let (delay, priority) = match self.class {
            DeviceClass::Standard => {
                debug!("keep-alive suppressed on standard device");
                return Ok(());
            }
            DeviceClass::RestrictedModern => (KEEP_ALIVE_DELAY_MODERN, NotificationPriority::Default),
            DeviceClass::RestrictedLegacy => (KEEP_ALIVE_DELAY_LEGACY, NotificationPriority::Low),
        };

        let request = NotificationRequest {
            id: Uuid::new_v4(),
            title: "FufflyChat".to_string(),
            body: "正在保持连接".to_string(),
            channel_id: CHANNEL_DEFAULT.to_string(),
            priority,
            sticky: false,
            sound_enabled: false,
            delay: Some(delay),
            metadata: HashMap::from([
                ("kind".to_string(), json!("keep-alive")),
                ("classification".to_string(), json!(self.class.to_string())),
                ("emitted_at_ms".to_string(), json!(unix_millis())),
            ]),
        };

        self.emit(request).await
    }

    /// Validate the channel contract, then hand off to the platform.
    /// Platform-level failures are swallowed here: delivery is best-effort
    /// and must never crash the host.
    async fn emit(&self, request: NotificationRequest) -> Result<(), ScheduleError> {
        if !self.provisioner.is_provisioned(&request.channel_id) {
            error!(
                channel = %request.channel_id,
                class = %self.class,
                "emission against unprovisioned channel"
            );
            return Err(ScheduleError::ChannelNotProvisioned(request.channel_id));
        }

        if let Err(e) = self.platform.present(&request).await {
            warn!(id = %request.id, error = %e, "notification delivery failed");
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
