//! Storage and File System Abstractions
//!
//! Provides platform-agnostic traits for durable key-value settings, resolving
//! a [`Locator`] into bytes, and enumerating audio candidates in a directory.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::source::Locator;

/// One entry returned by [`DirectoryLister::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    /// Last modification time in Unix milliseconds, when the platform reports it.
    pub last_modified: Option<i64>,
    pub is_directory: bool,
}

impl DirectoryEntry {
    pub fn file(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            size,
            last_modified: None,
            is_directory: false,
        }
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            is_directory: true,
            ..Self::file(path, 0)
        }
    }

    pub fn with_last_modified(mut self, millis: i64) -> Self {
        self.last_modified = Some(millis);
        self
    }
}

/// Resolves a [`Locator`] to its full byte content.
///
/// - Desktop: read from the filesystem, fetch remote URLs over HTTP
/// - Android/iOS: content resolver / security-scoped bookmarks
///
/// Implementations should report a missing source as
/// [`BridgeError::NotFound`](crate::BridgeError::NotFound) and a refused one
/// as [`BridgeError::PermissionDenied`](crate::BridgeError::PermissionDenied).
#[async_trait]
pub trait ByteSourceResolver: Send + Sync {
    async fn resolve(&self, locator: &Locator) -> Result<Bytes>;
}

/// Enumerates the immediate children of a directory scope.
///
/// Recursion is the caller's decision; implementations return one level.
#[async_trait]
pub trait DirectoryLister: Send + Sync {
    async fn list(&self, dir: &Path) -> Result<Vec<DirectoryEntry>>;
}

/// Key-value settings storage trait
///
/// Abstracts platform-specific preferences storage:
/// - iOS: UserDefaults
/// - Android: SharedPreferences / DataStore
/// - Desktop: SQLite-backed store
///
/// Writes are last-write-wins per key. A successful `set_string` must be
/// visible to a later `get_string` on the same store, including after restart.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn save(store: &dyn SettingsStore, json: &str) -> Result<()> {
///     store.set_string("playlists", json).await
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.get_string(key).await?.is_some())
    }

    /// List all setting keys
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Clear all settings
    async fn clear_all(&self) -> Result<()>;
}
