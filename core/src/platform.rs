//! Platform seam for the host notification stack
//!
//! Everything the core needs from the OS goes through [`NotificationPlatform`]:
//! permission prompts, channel provisioning, push-token issuance and
//! notification presentation. The host bindings (Android/iOS) implement this
//! trait; tests substitute a mock.

use async_trait::async_trait;
use thiserror::Error;

use crate::channel::ChannelDescriptor;
use crate::scheduler::NotificationRequest;

#[cfg(test)]
use mockall::automock;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Failure surfaced by the host platform layer
#[derive(Debug, Error, Clone)]
pub enum PlatformError {
    #[error("platform call failed: {0}")]
    CallFailed(String),

    #[error("operation not supported on this platform")]
    Unsupported,
}

// ============================================================================
// PERMISSION STATUS
// ============================================================================

/// Notification permission state as reported by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// User granted notification permission
    Granted,
    /// User explicitly declined
    Denied,
    /// Never asked, or the OS cannot tell
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

// ============================================================================
// PLATFORM TRAIT
// ============================================================================

/// Asynchronous bridge to the host notification stack.
///
/// All methods are suspension points on the app's single logical event loop;
/// implementations must not block.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    /// Query the current permission state without prompting the user
    async fn permission_status(&self) -> Result<PermissionStatus, PlatformError>;

    /// Show the interactive permission prompt and return the resulting state
    async fn request_permission(&self) -> Result<PermissionStatus, PlatformError>;

    /// Create the channel, or update it in place if the id already exists
    async fn apply_channel(&self, descriptor: &ChannelDescriptor) -> Result<(), PlatformError>;

    /// Retrieve the push registration token for this installation
    async fn push_token(&self, project_id: &str) -> Result<String, PlatformError>;

    /// Hand a notification request to the OS for display
    async fn present(&self, request: &NotificationRequest) -> Result<(), PlatformError>;
}
