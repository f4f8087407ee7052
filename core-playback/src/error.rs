//! # Playback Error Types

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The track's bytes could not be obtained (file deleted, permission
    /// revoked, handle expired).
    #[error("Audio source unavailable: {0}")]
    SourceUnavailable(String),

    /// Every source attempt was rejected by the platform.
    #[error("Playback operation failed: {0}")]
    PlaybackFailed(String),

    /// The platform adapter reported an error.
    #[error("Playback adapter error: {0}")]
    Adapter(#[from] BridgeError),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if retrying the same track may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            PlaybackError::SourceUnavailable(_) => true,
            PlaybackError::Adapter(err) => !err.is_not_found() && !err.is_permission_denied(),
            _ => false,
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
