//! Notification core facade and event loop
//!
//! The host bindings create a [`NotificationCore`] at startup, feed it
//! [`AppEvent`]s from the embedded surface and lifecycle hooks, and read
//! the classification and token back out. State flows one way:
//! classification -> provisioning -> registration -> scheduling; nothing
//! downstream mutates anything upstream.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::channel::ChannelProvisioner;
use crate::device::{classify, DeviceClass, DeviceProfile};
use crate::guidance::{select_guide, GuideVariant};
use crate::permission::{
    PermissionCoordinator, RegistrationError, RegistrationState, RegistrationToken,
};
use crate::platform::NotificationPlatform;
use crate::scheduler::NotificationScheduler;

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Error, Clone)]
pub enum CoreError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Process-wide immutable configuration, built once before any component
/// runs and injected — never read from ambient global state.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Push-service project identifier; token issuance fails without it
    pub project_id: Option<String>,
    /// Title used for inbound-message alerts
    pub app_display_name: String,
    /// Body used for inbound-message alerts (the surface event carries none)
    pub default_alert_body: String,
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.app_display_name.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "app_display_name cannot be empty".to_string(),
            ));
        }
        if self.default_alert_body.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "default_alert_body cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            app_display_name: "FufflyChat".to_string(),
            default_alert_body: "您有新消息".to_string(),
        }
    }
}

// ============================================================================
// EVENTS
// ============================================================================

/// Inbound triggers from the excluded UI collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The embedded surface observed a new message; payload stays external
    MessageObserved,
    /// User tapped "send test notification" in settings
    TestNotificationRequested,
    /// The application moved to a background-execution state
    EnteredBackground,
}

// ============================================================================
// NOTIFICATION CORE
// ============================================================================

/// Top-level handle wiring classifier, provisioner, coordinator and scheduler
pub struct NotificationCore {
    profile: DeviceProfile,
    class: DeviceClass,
    config: CoreConfig,
    coordinator: PermissionCoordinator,
    scheduler: NotificationScheduler,
}

impl NotificationCore {
    /// Classify the device once and wire up the subsystem. The classification
    /// and config are read-only for the rest of the process lifetime.
    pub fn new(
        platform: Arc<dyn NotificationPlatform>,
        profile: DeviceProfile,
        config: CoreConfig,
    ) -> Result<Self, CoreError> {
        config.validate()?;

        let class = classify(&profile);
        info!(
            %class,
            brand = %profile.brand,
            os_version = %profile.os_version,
            physical = profile.is_physical_device,
            "device classified"
        );

        let provisioner = Arc::new(ChannelProvisioner::new(platform.clone()));
        let coordinator = PermissionCoordinator::new(platform.clone(), provisioner.clone());
        let scheduler = NotificationScheduler::new(platform, provisioner, class);

        Ok(Self {
            profile,
            class,
            config,
            coordinator,
            scheduler,
        })
    }

    pub fn classification(&self) -> DeviceClass {
        self.class
    }

    pub fn registration_state(&self) -> RegistrationState {
        self.coordinator.state()
    }

    /// Exposed for display/debugging by the settings screens
    pub fn registration_token(&self) -> Option<RegistrationToken> {
        self.coordinator.token()
    }

    /// Which setup guide the UI should offer, if any
    pub fn guide(&self) -> Option<GuideVariant> {
        select_guide(self.class)
    }

    /// Full registration flow: channels, permission, token
    pub async fn register(&self) -> Result<RegistrationToken, RegistrationError> {
        self.coordinator
            .register(&self.profile, self.class, self.config.project_id.as_deref())
            .await
    }

    /// Lazily-invoked entry point for the UI layer
    pub async fn register_if_needed(&self) -> Result<RegistrationToken, RegistrationError> {
        self.coordinator
            .register_if_needed(&self.profile, self.class, self.config.project_id.as_deref())
            .await
    }

    /// Dispatch one inbound event. Never panics the host: scheduling
    /// contract violations are error-logged and dropped.
    pub async fn handle_event(&self, event: AppEvent) {
        let result = match event {
            AppEvent::MessageObserved => {
                self.scheduler
                    .emit_message_alert(&self.config.app_display_name, &self.config.default_alert_body)
                    .await
            }
            AppEvent::TestNotificationRequested => {
                self.scheduler
                    .emit_message_alert("FufflyChat 测试", "这是一条测试通知消息")
                    .await
            }
            AppEvent::EnteredBackground => {
                if self.class.is_restricted() {
                    self.scheduler.emit_keep_alive().await
                } else {
                    Ok(())
                }
            }
        };

        if let Err(e) = result {
            error!(?event, error = %e, "event dropped");
        }
    }

    /// Cooperative event loop: one event at a time, in order. Returns when
    /// every sender is dropped — dropping the sender side is how a
    /// tearing-down UI releases its listener.
    pub async fn run(&self, mut events: mpsc::Receiver<AppEvent>) {
        while let Some(event) = events.recv().await {
            debug!(?event, "handling app event");
            self.handle_event(event).await;
        }
        debug!("event channel closed; notification loop stopped");
    }
}

// ============================================================================
// TESTS
// ============================================================================
