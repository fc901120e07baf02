//! User notification preferences
//!
//! Read and written by the settings screens; the emission paths themselves
//! never consult `enabled` — suppressing calls when the user opted out is
//! the caller's contract.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::permission::RegistrationToken;
use crate::store::{KeyValueStore, StoreError};

/// Storage keys shared with the UI layer
const SETTINGS_KEY: &str = "notificationSettings";
const TOKEN_KEY: &str = "pushToken";

// ============================================================================
// SETTINGS
// ============================================================================

/// User-facing notification toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Master toggle; when false the caller must not invoke emission
    pub enabled: bool,
    pub sound: bool,
    pub vibration: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: true,
            vibration: true,
        }
    }
}

// ============================================================================
// SETTINGS STORE
// ============================================================================

/// Typed wrapper over the key-value backend
pub struct SettingsStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Load settings, falling back to defaults when absent or corrupt
    pub fn load(&self) -> NotificationSettings {
        match self.backend.get(SETTINGS_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!(error = %e, "corrupt notification settings; using defaults");
                    NotificationSettings::default()
                }
            },
            Ok(None) => NotificationSettings::default(),
            Err(e) => {
                warn!(error = %e, "settings read failed; using defaults");
                NotificationSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &NotificationSettings) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(settings)?;
        self.backend.put(SETTINGS_KEY, &bytes)
    }

    /// Token cached for display/debugging across restarts. Registration
    /// itself never reads this — the token is re-acquired per process.
    pub fn cached_token(&self) -> Option<RegistrationToken> {
        match self.backend.get(TOKEN_KEY) {
            Ok(Some(bytes)) => String::from_utf8(bytes).ok().map(RegistrationToken::new),
            _ => None,
        }
    }

    pub fn store_token(&self, token: &RegistrationToken) -> Result<(), StoreError> {
        self.backend.put(TOKEN_KEY, token.as_str().as_bytes())
    }

    pub fn clear_token(&self) -> Result<(), StoreError> {
        self.backend.remove(TOKEN_KEY)
    }
}

// ============================================================================
// TESTS
// ============================================================================
