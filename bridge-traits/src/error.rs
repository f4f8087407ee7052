use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Classify an I/O error by kind, keeping `NotFound` and
    /// `PermissionDenied` distinguishable for callers.
    pub fn from_io(context: impl Into<String>, err: std::io::Error) -> Self {
        let context = context.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(context),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(context),
            _ => Self::Io(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
