use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    /// The content hash matches a track already in the library.
    #[error("Duplicate content: matches existing track {existing_id}")]
    Duplicate { existing_id: String },

    #[error("Index {index} out of range for {entity} of length {len}")]
    IndexOutOfRange {
        entity: &'static str,
        index: usize,
        len: usize,
    },

    /// A durable write failed; in-memory state was left unchanged.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Bridge error: {0}")]
    Bridge(BridgeError),
}

impl LibraryError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

impl From<BridgeError> for LibraryError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::PermissionDenied(what) => Self::PermissionDenied(what),
            BridgeError::NotFound(what) => Self::NotFound {
                entity_type: "source".to_string(),
                id: what,
            },
            other => Self::Bridge(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_errors_keep_their_meaning() {
        let denied: LibraryError = BridgeError::PermissionDenied("Music".into()).into();
        assert!(matches!(denied, LibraryError::PermissionDenied(_)));

        let missing: LibraryError = BridgeError::NotFound("a.mp3".into()).into();
        assert!(matches!(missing, LibraryError::NotFound { .. }));

        let other: LibraryError = BridgeError::OperationFailed("disk".into()).into();
        assert!(matches!(other, LibraryError::Bridge(_)));
    }
}
