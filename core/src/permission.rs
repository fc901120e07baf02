//! Permission acquisition and push registration
//!
//! Drives the asynchronous flow from "never asked" to "holding a push token":
//! provision channels, query or request permission, then fetch the token.
//! The state machine is
//! `Unregistered -> PermissionRequested -> {Granted, Denied}` and
//! `Granted -> {TokenAcquired, TokenAcquisitionFailed}`.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::channel::ChannelProvisioner;
use crate::device::{DeviceClass, DeviceProfile};
use crate::platform::{NotificationPlatform, PermissionStatus};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Typed outcomes of a failed registration attempt
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// User declined the permission prompt. Recoverable by asking again,
    /// but never retried automatically.
    #[error("notification permission denied by user")]
    PermissionDenied,

    /// Push services are unavailable on emulators/simulators. Fatal for
    /// this environment.
    #[error("push registration requires a physical device")]
    NotAPhysicalDevice,

    /// Platform or configuration failure while fetching the token.
    /// Recoverable by calling register() again once the cause is fixed.
    #[error("push token unavailable: {0}")]
    TokenUnavailable(String),
}

// ============================================================================
// STATE & TOKEN
// ============================================================================

/// Registration lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationState {
    /// Nothing attempted yet
    Unregistered,
    /// Interactive permission prompt in flight
    PermissionRequested,
    /// Permission granted, token not yet fetched
    Granted,
    /// Terminal: user declined
    Denied,
    /// Terminal: token held
    TokenAcquired,
    /// Terminal for this attempt: token fetch failed (retryable)
    TokenAcquisitionFailed,
}

impl std::fmt::Display for RegistrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unregistered => write!(f, "Unregistered"),
            Self::PermissionRequested => write!(f, "PermissionRequested"),
            Self::Granted => write!(f, "Granted"),
            Self::Denied => write!(f, "Denied"),
            Self::TokenAcquired => write!(f, "TokenAcquired"),
            Self::TokenAcquisitionFailed => write!(f, "TokenAcquisitionFailed"),
        }
    }
}

/// Opaque push-service token scoped to one installation. Invalidated by a
/// permission revocation; re-registration must be triggered explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationToken(String);

impl RegistrationToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RegistrationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// COORDINATOR
// ============================================================================

/// Sequences channel provisioning, permission acquisition and token retrieval
pub struct PermissionCoordinator {
    platform: Arc<dyn NotificationPlatform>,
    provisioner: Arc<ChannelProvisioner>,
    state: RwLock<RegistrationState>,
    token: RwLock<Option<RegistrationToken>>,
}

impl PermissionCoordinator {
    pub fn new(platform: Arc<dyn NotificationPlatform>, provisioner: Arc<ChannelProvisioner>) -> Self {
        Self {
            platform,
            provisioner,
            state: RwLock::new(RegistrationState::Unregistered),
            token: RwLock::new(None),
        }
    }

    pub fn state(&self) -> RegistrationState {
        *self.state.read()
    }

    pub fn token(&self) -> Option<RegistrationToken> {
        self.token.read().clone()
    }

    /// Run the full registration flow.
    ///
    /// Channels are provisioned before anything else so the scheduler always
    /// has its targets once permission lands. A simulated device fails fast
    /// without ever touching the permission API.
    pub async fn register(
        &self,
        profile: &DeviceProfile,
        class: DeviceClass,
        project_id: Option<&str>,
    ) -> Result<RegistrationToken, RegistrationError> {
        if !profile.is_physical_device {
            warn!("push registration attempted on a simulated device");
            *self.state.write() = RegistrationState::TokenAcquisitionFailed;
            return Err(RegistrationError::NotAPhysicalDevice);
        }

        let outcome = self.provisioner.ensure_channels(class).await;
        if outcome.is_partial() {
            warn!(
                failed = outcome.failures.len(),
                "continuing registration with partially provisioned channels"
            );
        }

        // Never double-prompt a user who already granted
        let existing = match self.platform.permission_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "permission query failed; treating as undetermined");
                PermissionStatus::Undetermined
            }
        };

        let final_status = if existing.is_granted() {
            existing
        } else {
            *self.state.write() = RegistrationState::PermissionRequested;
            match self.platform.request_permission().await {
                Ok(status) => status,
                Err(e) => {
                    warn!(error = %e, "permission request failed; treating as denied");
                    PermissionStatus::Denied
                }
            }
        };

        if !final_status.is_granted() {
            *self.state.write() = RegistrationState::Denied;
            return Err(RegistrationError::PermissionDenied);
        }

        *self.state.write() = RegistrationState::Granted;

        let Some(project_id) = project_id else {
            *self.state.write() = RegistrationState::TokenAcquisitionFailed;
            return Err(RegistrationError::TokenUnavailable(
                "project id missing from configuration".to_string(),
            ));
        };

        match self.platform.push_token(project_id).await {
            Ok(raw) => {
                let token = RegistrationToken::new(raw);
                *self.token.write() = Some(token.clone());
                *self.state.write() = RegistrationState::TokenAcquired;
                info!("push registration complete");
                Ok(token)
            }
            Err(e) => {
                *self.state.write() = RegistrationState::TokenAcquisitionFailed;
                Err(RegistrationError::TokenUnavailable(e.to_string()))
            }
        }
    }

    /// Lazy entry point: reuse a held token, refuse to re-prompt after a
    /// denial, and otherwise (including after a failed token fetch) run the
    /// full flow.
    pub async fn register_if_needed(
        &self,
        profile: &DeviceProfile,
        class: DeviceClass,
        project_id: Option<&str>,
    ) -> Result<RegistrationToken, RegistrationError> {
        match self.state() {
            RegistrationState::TokenAcquired => {
                if let Some(token) = self.token() {
                    return Ok(token);
                }
                // Token state without a token should not happen; fall through
                self.register(profile, class, project_id).await
            }
            RegistrationState::Denied => Err(RegistrationError::PermissionDenied),
            _ => self.register(profile, class, project_id).await,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
