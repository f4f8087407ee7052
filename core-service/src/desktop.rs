//! Desktop bootstrap.
//!
//! Wires the `bridge-desktop` adapters into a [`CoreConfigBuilder`]; the host
//! still supplies its audio element and library scopes.

use crate::Result;
use bridge_desktop::{ReqwestHttpClient, SqliteSettingsStore, TokioFileSystem};
use bridge_traits::{HttpClient, PlaybackAdapter, SettingsStore};
use core_runtime::config::{CoreConfig, CoreConfigBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Where the desktop settings database lives.
#[derive(Debug, Clone, Default)]
pub enum SettingsLocation {
    /// `<data dir>/tunedeck/settings.db`
    #[default]
    Default,
    Path(PathBuf),
    /// Throwaway store, for demos and tests
    InMemory,
}

/// Builder pre-populated with desktop adapters.
///
/// With the `deezer` feature, catalog search is wired to the Deezer API.
pub async fn desktop_builder(
    playback_adapter: Arc<dyn PlaybackAdapter>,
    location: SettingsLocation,
) -> Result<CoreConfigBuilder> {
    let settings: Arc<dyn SettingsStore> = match location {
        SettingsLocation::Default => Arc::new(SqliteSettingsStore::default_location().await?),
        SettingsLocation::Path(path) => Arc::new(SqliteSettingsStore::new(path).await?),
        SettingsLocation::InMemory => Arc::new(SqliteSettingsStore::in_memory().await?),
    };

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new()?);
    let files = Arc::new(TokioFileSystem::new().with_http_client(http.clone()));

    let builder = CoreConfig::builder()
        .settings_store(settings)
        .playback_adapter(playback_adapter)
        .byte_resolver(files.clone())
        .directory_lister(files);

    #[cfg(feature = "deezer")]
    let builder = builder.search_provider(Arc::new(
        provider_deezer::DeezerSearchProvider::new(http),
    ));

    info!("Desktop adapters configured");
    Ok(builder)
}
