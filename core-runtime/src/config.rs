//! # Core Configuration Module
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! holding every platform collaborator the player core needs. It enforces
//! fail-fast validation so a missing bridge is reported at startup rather than
//! on the first scan or play.
//!
//! ## Required Dependencies
//!
//! - `SettingsStore` - durable storage for the library and playlist snapshots
//! - `PlaybackAdapter` - the platform audio element
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `ByteSourceResolver` - reads locators into bytes (desktop default: tokio fs)
//! - `DirectoryLister` - enumerates library scopes (desktop default: tokio fs)
//! - `PermissionPrompt` - storage permission (desktop default: always granted)
//! - `SearchProvider` - streaming catalog search (no default; search is disabled)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .settings_store(Arc::new(settings))
//!     .playback_adapter(Arc::new(adapter))
//!     .library_scope("/storage/emulated/0/Music")
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{
    ByteSourceResolver, DirectoryLister, PermissionPrompt, PlaybackAdapter, SearchProvider,
    SettingsStore,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Default key of the persisted library snapshot.
pub const DEFAULT_LIBRARY_KEY: &str = "library";
/// Default key of the persisted playlist snapshot.
pub const DEFAULT_PLAYLISTS_KEY: &str = "playlists";
/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_BUFFER: usize = 100;

const MAX_EVENT_BUFFER: usize = 65_536;

/// Core configuration for the player core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Durable key-value store (required)
    pub settings_store: Arc<dyn SettingsStore>,

    /// Platform audio element (required)
    pub playback_adapter: Arc<dyn PlaybackAdapter>,

    pub byte_resolver: Arc<dyn ByteSourceResolver>,

    pub directory_lister: Arc<dyn DirectoryLister>,

    pub permission_prompt: Arc<dyn PermissionPrompt>,

    /// Streaming catalog; search returns nothing when absent
    pub search_provider: Option<Arc<dyn SearchProvider>>,

    /// Directories scanned by `scan_library`
    pub library_scopes: Vec<PathBuf>,

    pub library_key: String,

    pub playlists_key: String,

    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("settings_store", &"SettingsStore { ... }")
            .field("playback_adapter", &"PlaybackAdapter { ... }")
            .field("byte_resolver", &"ByteSourceResolver { ... }")
            .field("directory_lister", &"DirectoryLister { ... }")
            .field("permission_prompt", &"PermissionPrompt { ... }")
            .field(
                "search_provider",
                &self.search_provider.as_ref().map(|p| p.name().to_string()),
            )
            .field("library_scopes", &self.library_scopes)
            .field("library_key", &self.library_key)
            .field("playlists_key", &self.playlists_key)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Storage keys are non-empty and distinct
    /// - Event buffer size is within `1..=65536`
    /// - Library scopes are non-empty paths
    pub fn validate(&self) -> Result<()> {
        if self.library_key.trim().is_empty() {
            return Err(Error::Config("Library key cannot be empty".to_string()));
        }

        if self.playlists_key.trim().is_empty() {
            return Err(Error::Config("Playlists key cannot be empty".to_string()));
        }

        if self.library_key == self.playlists_key {
            return Err(Error::Config(format!(
                "Library and playlists must use different keys (both are '{}')",
                self.library_key
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        if self.event_buffer_size > MAX_EVENT_BUFFER {
            return Err(Error::Config(format!(
                "Event buffer size exceeds maximum of {}",
                MAX_EVENT_BUFFER
            )));
        }

        if self
            .library_scopes
            .iter()
            .any(|scope| scope.as_os_str().is_empty())
        {
            return Err(Error::Config(
                "Library scopes cannot contain an empty path".to_string(),
            ));
        }

        Ok(())
    }
}

fn settings_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required to persist the library and playlists. \
                 Desktop: use bridge_desktop::SqliteSettingsStore. \
                 Mobile: inject platform-native preferences (UserDefaults/DataStore)."
            .to_string(),
    }
}

fn playback_adapter_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "PlaybackAdapter".to_string(),
        message: "PlaybackAdapter implementation is required for playback. \
                 Inject the host's audio element (MediaPlayer/AVPlayer/HTML audio)."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
mod defaults {
    use super::*;
    use bridge_desktop::{DesktopPermissionPrompt, TokioFileSystem};

    pub(super) fn byte_resolver() -> Result<Arc<dyn ByteSourceResolver>> {
        Ok(Arc::new(TokioFileSystem::new()))
    }

    pub(super) fn directory_lister() -> Result<Arc<dyn DirectoryLister>> {
        Ok(Arc::new(TokioFileSystem::new()))
    }

    pub(super) fn permission_prompt() -> Result<Arc<dyn PermissionPrompt>> {
        Ok(Arc::new(DesktopPermissionPrompt))
    }
}

#[cfg(not(feature = "desktop-shims"))]
mod defaults {
    use super::*;

    fn missing(capability: &str, purpose: &str) -> Error {
        Error::CapabilityMissing {
            capability: capability.to_string(),
            message: format!(
                "{} implementation is required to {}. \
                 Desktop: enable the 'desktop-shims' feature. \
                 Mobile: inject the platform implementation.",
                capability, purpose
            ),
        }
    }

    pub(super) fn byte_resolver() -> Result<Arc<dyn ByteSourceResolver>> {
        Err(missing("ByteSourceResolver", "read audio files"))
    }

    pub(super) fn directory_lister() -> Result<Arc<dyn DirectoryLister>> {
        Err(missing("DirectoryLister", "scan library folders"))
    }

    pub(super) fn permission_prompt() -> Result<Arc<dyn PermissionPrompt>> {
        Err(missing("PermissionPrompt", "request storage access"))
    }
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    settings_store: Option<Arc<dyn SettingsStore>>,
    playback_adapter: Option<Arc<dyn PlaybackAdapter>>,
    byte_resolver: Option<Arc<dyn ByteSourceResolver>>,
    directory_lister: Option<Arc<dyn DirectoryLister>>,
    permission_prompt: Option<Arc<dyn PermissionPrompt>>,
    search_provider: Option<Arc<dyn SearchProvider>>,
    library_scopes: Vec<PathBuf>,
    library_key: Option<String>,
    playlists_key: Option<String>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the settings store implementation (required).
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets the playback adapter implementation (required).
    pub fn playback_adapter(mut self, adapter: Arc<dyn PlaybackAdapter>) -> Self {
        self.playback_adapter = Some(adapter);
        self
    }

    /// Sets the byte source resolver.
    ///
    /// If not provided, the tokio filesystem resolver is used when the
    /// `desktop-shims` feature is enabled.
    pub fn byte_resolver(mut self, resolver: Arc<dyn ByteSourceResolver>) -> Self {
        self.byte_resolver = Some(resolver);
        self
    }

    pub fn directory_lister(mut self, lister: Arc<dyn DirectoryLister>) -> Self {
        self.directory_lister = Some(lister);
        self
    }

    pub fn permission_prompt(mut self, prompt: Arc<dyn PermissionPrompt>) -> Self {
        self.permission_prompt = Some(prompt);
        self
    }

    /// Enables catalog search.
    pub fn search_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.search_provider = Some(provider);
        self
    }

    /// Adds one directory to scan.
    pub fn library_scope<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.library_scopes.push(path.into());
        self
    }

    /// Replaces all scan directories.
    pub fn library_scopes<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.library_scopes = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Default: `"library"`
    pub fn library_key(mut self, key: impl Into<String>) -> Self {
        self.library_key = Some(key.into());
        self
    }

    /// Default: `"playlists"`
    pub fn playlists_key(mut self, key: impl Into<String>) -> Self {
        self.playlists_key = Some(key.into());
        self
    }

    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Returns an error if a required bridge is missing, a defaulted bridge
    /// is unavailable on this build, or a value fails [`CoreConfig::validate`].
    pub fn build(self) -> Result<CoreConfig> {
        let settings_store = self
            .settings_store
            .ok_or_else(settings_store_missing_error)?;

        let playback_adapter = self
            .playback_adapter
            .ok_or_else(playback_adapter_missing_error)?;

        let byte_resolver = match self.byte_resolver {
            Some(resolver) => resolver,
            None => defaults::byte_resolver()?,
        };

        let directory_lister = match self.directory_lister {
            Some(lister) => lister,
            None => defaults::directory_lister()?,
        };

        let permission_prompt = match self.permission_prompt {
            Some(prompt) => prompt,
            None => defaults::permission_prompt()?,
        };

        let config = CoreConfig {
            settings_store,
            playback_adapter,
            byte_resolver,
            directory_lister,
            permission_prompt,
            search_provider: self.search_provider,
            library_scopes: self.library_scopes,
            library_key: self
                .library_key
                .unwrap_or_else(|| DEFAULT_LIBRARY_KEY.to_string()),
            playlists_key: self
                .playlists_key
                .unwrap_or_else(|| DEFAULT_PLAYLISTS_KEY.to_string()),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER),
        };

        config.validate()?;

        Ok(config)
    }
}
