//! Streaming catalog search abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A track returned by a streaming catalog.
///
/// Catalog tracks are never added to the local library; they are played as
/// transient previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogTrack {
    /// Provider-specific identifier, stringified.
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    /// Cover image URL.
    pub cover: Option<String>,
    /// Short preview clip URL, when the catalog exposes one.
    pub preview_url: Option<String>,
}

impl CatalogTrack {
    pub fn has_preview(&self) -> bool {
        self.preview_url
            .as_deref()
            .map(|url| !url.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Free-text search against a remote catalog.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short provider name used in logs (e.g. `"deezer"`).
    fn name(&self) -> &str;

    /// Search the catalog. An empty result is not an error.
    async fn search(&self, query: &str) -> Result<Vec<CatalogTrack>>;
}
