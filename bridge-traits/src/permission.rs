//! Storage permission abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Outcome of a storage permission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// Checks and requests access to the user's media storage.
///
/// - Android: `READ_MEDIA_AUDIO` / `READ_EXTERNAL_STORAGE`
/// - iOS: media library authorization
/// - Desktop: always granted
#[async_trait]
pub trait PermissionPrompt: Send + Sync {
    /// Current status, without prompting the user.
    async fn check(&self) -> Result<PermissionStatus>;

    /// Prompt the user if needed and return the resulting status.
    async fn request(&self) -> Result<PermissionStatus>;
}
