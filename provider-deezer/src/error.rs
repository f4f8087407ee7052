//! Error types for the Deezer provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Deezer provider errors
#[derive(Error, Debug)]
pub enum DeezerError {
    /// API request returned an error status or an error object
    #[error("Deezer API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Result type for Deezer operations
pub type Result<T> = std::result::Result<T, DeezerError>;

impl From<DeezerError> for BridgeError {
    fn from(error: DeezerError) -> Self {
        match error {
            DeezerError::ApiError {
                status_code,
                message,
            } => BridgeError::OperationFailed(format!(
                "Deezer API error (status {}): {}",
                status_code, message
            )),
            DeezerError::ParseError(msg) => {
                BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            DeezerError::Bridge(e) => e,
        }
    }
}
