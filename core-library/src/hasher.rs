//! Content fingerprinting
//!
//! A track's identity is the SHA-256 digest of its full byte content,
//! rendered as lowercase hex.

use crate::models::ContentHash;
use sha2::{Digest, Sha256};

/// Stateless SHA-256 fingerprinter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher;

impl ContentHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash a complete buffer.
    pub fn hash(&self, data: &[u8]) -> ContentHash {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash::from_hex(format!("{:x}", hasher.finalize()))
    }

    /// Start an incremental hash for chunked input.
    pub fn incremental(&self) -> IncrementalHash {
        IncrementalHash {
            inner: Sha256::new(),
        }
    }
}

/// Chunked form of [`ContentHasher::hash`]; feeding the same bytes in any
/// chunking yields the same digest.
#[derive(Debug, Clone)]
pub struct IncrementalHash {
    inner: Sha256,
}

impl IncrementalHash {
    pub fn update(&mut self, chunk: &[u8]) -> &mut Self {
        self.inner.update(chunk);
        self
    }

    pub fn finalize(self) -> ContentHash {
        ContentHash::from_hex(format!("{:x}", self.inner.finalize()))
    }
}
