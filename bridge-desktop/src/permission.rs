//! Desktop storage permission shim.

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    permission::{PermissionPrompt, PermissionStatus},
};

/// Desktop processes already run with the user's filesystem rights, so
/// access is always granted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopPermissionPrompt;

#[async_trait]
impl PermissionPrompt for DesktopPermissionPrompt {
    async fn check(&self) -> Result<PermissionStatus> {
        Ok(PermissionStatus::Granted)
    }

    async fn request(&self) -> Result<PermissionStatus> {
        Ok(PermissionStatus::Granted)
    }
}
