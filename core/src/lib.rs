// FufflyChat Core — Notification Spine
//
// The embedded site cannot wake the device or post system notifications,
// so this crate does: classify the vendor ROM, provision channels, acquire
// permission and a push token, and emit message alerts plus keep-alive
// pings tuned to whatever the ROM tolerates.
//
// The UI screens (webview surface, settings, history, guide content) live
// with the host bindings; they feed events in and read classification and
// token back out.

pub mod channel;
pub mod device;
pub mod guidance;
pub mod permission;
pub mod platform;
pub mod scheduler;
pub mod service;
pub mod settings;
pub mod store;

pub use channel::{
    required_channels, ChannelDescriptor, ChannelImportance, ChannelProvisioner,
    LockscreenVisibility, ProvisionOutcome, CHANNEL_DEFAULT, CHANNEL_MESSAGES, CHANNEL_URGENT,
};
pub use device::{classify, DeviceClass, DeviceProfile};
pub use guidance::{select_guide, GuideVariant};
pub use permission::{
    PermissionCoordinator, RegistrationError, RegistrationState, RegistrationToken,
};
pub use platform::{NotificationPlatform, PermissionStatus, PlatformError};
pub use scheduler::{
    NotificationPriority, NotificationRequest, NotificationScheduler, ScheduleError,
};
pub use service::{AppEvent, CoreConfig, CoreError, NotificationCore};
pub use settings::{NotificationSettings, SettingsStore};
pub use store::{KeyValueStore, MemoryStore, SledStore, StoreError};
