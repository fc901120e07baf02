//! Registration failure modes against a configurable platform stub

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use fufflychat_core::{
    ChannelDescriptor, CoreConfig, DeviceProfile, NotificationCore, NotificationPlatform,
    NotificationRequest, PermissionStatus, PlatformError, RegistrationError, RegistrationState,
};

/// Stub whose permission and token behavior is fixed at construction
struct ScriptedPlatform {
    existing: PermissionStatus,
    prompt_result: PermissionStatus,
    token_fails: bool,
    prompt_calls: AtomicU32,
    status_calls: AtomicU32,
    token_calls: AtomicU32,
}

impl ScriptedPlatform {
    fn new(existing: PermissionStatus, prompt_result: PermissionStatus, token_fails: bool) -> Self {
        Self {
            existing,
            prompt_result,
            token_fails,
            prompt_calls: AtomicU32::new(0),
            status_calls: AtomicU32::new(0),
            token_calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl NotificationPlatform for ScriptedPlatform {
    async fn permission_status(&self) -> Result<PermissionStatus, PlatformError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.existing)
    }

    async fn request_permission(&self) -> Result<PermissionStatus, PlatformError> {
        self.prompt_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.prompt_result)
    }

    async fn apply_channel(&self, _descriptor: &ChannelDescriptor) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn push_token(&self, _project_id: &str) -> Result<String, PlatformError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        if self.token_fails {
            Err(PlatformError::CallFailed("push service unreachable".to_string()))
        } else {
            Ok("tok".to_string())
        }
    }

    async fn present(&self, _request: &NotificationRequest) -> Result<(), PlatformError> {
        Ok(())
    }
}

fn core_with(platform: Arc<ScriptedPlatform>, profile: DeviceProfile, project_id: Option<&str>) -> NotificationCore {
    let config = CoreConfig {
        project_id: project_id.map(str::to_string),
        ..Default::default()
    };
    NotificationCore::new(platform, profile, config).unwrap()
}

#[tokio::test]
async fn simulator_never_reaches_permission_api() {
    let platform = Arc::new(ScriptedPlatform::new(
        PermissionStatus::Undetermined,
        PermissionStatus::Granted,
        false,
    ));
    let profile = DeviceProfile::new("xiaomi", "Xiaomi", "14", false);
    let core = core_with(platform.clone(), profile, Some("proj"));

    let result = core.register().await;

    assert_eq!(result, Err(RegistrationError::NotAPhysicalDevice));
    assert_eq!(platform.status_calls.load(Ordering::SeqCst), 0);
    assert_eq!(platform.prompt_calls.load(Ordering::SeqCst), 0);
    assert_eq!(platform.token_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn already_granted_never_prompts() {
    let platform = Arc::new(ScriptedPlatform::new(
        PermissionStatus::Granted,
        PermissionStatus::Granted,
        false,
    ));
    let profile = DeviceProfile::new("google", "Google", "15", true);
    let core = core_with(platform.clone(), profile, Some("proj"));

    core.register().await.unwrap();

    assert_eq!(platform.prompt_calls.load(Ordering::SeqCst), 0);
    assert_eq!(core.registration_state(), RegistrationState::TokenAcquired);
}

#[tokio::test]
async fn denial_terminates_and_lazy_calls_never_reprompt() {
    let platform = Arc::new(ScriptedPlatform::new(
        PermissionStatus::Undetermined,
        PermissionStatus::Denied,
        false,
    ));
    let profile = DeviceProfile::new("xiaomi", "Xiaomi", "13", true);
    let core = core_with(platform.clone(), profile, Some("proj"));

    assert_eq!(core.register().await, Err(RegistrationError::PermissionDenied));
    assert_eq!(core.registration_state(), RegistrationState::Denied);

    // Lazy entry point surfaces the denial without a second prompt
    assert_eq!(
        core.register_if_needed().await,
        Err(RegistrationError::PermissionDenied)
    );
    assert_eq!(platform.prompt_calls.load(Ordering::SeqCst), 1);
    assert_eq!(platform.token_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_project_id_fails_without_token_call() {
    let platform = Arc::new(ScriptedPlatform::new(
        PermissionStatus::Granted,
        PermissionStatus::Granted,
        false,
    ));
    let profile = DeviceProfile::new("google", "Google", "15", true);
    let core = core_with(platform.clone(), profile, None);

    let result = core.register().await;

    assert!(matches!(result, Err(RegistrationError::TokenUnavailable(_))));
    assert_eq!(platform.token_calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        core.registration_state(),
        RegistrationState::TokenAcquisitionFailed
    );
    assert!(core.registration_token().is_none());
}

#[tokio::test]
async fn token_failure_is_typed_and_retryable() {
    let platform = Arc::new(ScriptedPlatform::new(
        PermissionStatus::Granted,
        PermissionStatus::Granted,
        true,
    ));
    let profile = DeviceProfile::new("google", "Google", "15", true);
    let core = core_with(platform.clone(), profile, Some("proj"));

    let result = core.register().await;
    match result {
        Err(RegistrationError::TokenUnavailable(msg)) => {
            assert!(msg.contains("push service unreachable"));
        }
        other => panic!("expected TokenUnavailable, got {:?}", other),
    }

    // A failed acquisition is not terminal for the lazy path
    let retry = core.register_if_needed().await;
    assert!(retry.is_err());
    assert_eq!(platform.token_calls.load(Ordering::SeqCst), 2);
}
