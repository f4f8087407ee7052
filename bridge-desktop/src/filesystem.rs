//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpRequest},
    source::Locator,
    storage::{ByteSourceResolver, DirectoryEntry, DirectoryLister},
};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tokio::fs;
use tracing::debug;

/// Tokio-based resolver and directory lister.
///
/// - `File` locators are read with `tokio::fs`
/// - `Embedded` locators return their bytes unchanged
/// - `Handle` locators are treated as paths (desktop pickers hand out paths,
///   optionally as `file://` URLs)
/// - `Remote` locators are fetched through the configured [`HttpClient`], if any
#[derive(Default)]
pub struct TokioFileSystem {
    http: Option<Arc<dyn HttpClient>>,
}

impl TokioFileSystem {
    pub fn new() -> Self {
        Self { http: None }
    }

    /// Enable resolving `Remote` locators.
    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    async fn read_path(path: &Path) -> Result<Bytes> {
        let data = fs::read(path)
            .await
            .map_err(|e| BridgeError::from_io(path.display().to_string(), e))?;
        debug!(path = ?path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn fetch(&self, url: &str) -> Result<Bytes> {
        let http = self.http.as_ref().ok_or_else(|| {
            BridgeError::NotAvailable("Remote sources need an HTTP client".to_string())
        })?;

        let response = http.execute(HttpRequest::get(url)).await?;
        match response.status {
            404 => Err(BridgeError::NotFound(url.to_string())),
            401 | 403 => Err(BridgeError::PermissionDenied(url.to_string())),
            _ if response.is_success() => Ok(response.body),
            status => Err(BridgeError::OperationFailed(format!(
                "HTTP {} fetching {}",
                status, url
            ))),
        }
    }
}

fn modified_millis(metadata: &std::fs::Metadata) -> Option<i64> {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .and_then(|d| i64::try_from(d.as_millis()).ok())
}

#[async_trait]
impl ByteSourceResolver for TokioFileSystem {
    async fn resolve(&self, locator: &Locator) -> Result<Bytes> {
        match locator {
            Locator::File { path } => Self::read_path(path).await,
            Locator::Embedded { data, .. } => Ok(data.clone()),
            Locator::Handle { handle, .. } => {
                let path = PathBuf::from(handle.strip_prefix("file://").unwrap_or(handle));
                Self::read_path(&path).await
            }
            Locator::Remote { url } => self.fetch(url).await,
        }
    }
}

#[async_trait]
impl DirectoryLister for TokioFileSystem {
    async fn list(&self, dir: &Path) -> Result<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(dir)
            .await
            .map_err(|e| BridgeError::from_io(dir.display().to_string(), e))?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| BridgeError::from_io(dir.display().to_string(), e))?
        {
            // Entries that vanish mid-listing are skipped.
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            entries.push(DirectoryEntry {
                path: entry.path(),
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                last_modified: modified_millis(&metadata),
                is_directory: metadata.is_dir(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(path = ?dir, count = entries.len(), "Listed directory");
        Ok(entries)
    }
}
