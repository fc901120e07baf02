// fufflychat-mobile — native mobile surface for the FufflyChat core
// The Android/iOS shells link this cdylib and implement NotificationPlatform
// over the host notification stack.

pub use fufflychat_core::*;
