//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (settings store,
//! audio element, file access, permission prompt, catalog search) into the
//! player core and exposes one handle to the presentation layer. Desktop apps
//! typically enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`); the `deezer` feature adds catalog search.
//!
//! ```ignore
//! let config = CoreConfig::builder()
//!     .settings_store(settings)
//!     .playback_adapter(adapter)
//!     .library_scope("/storage/emulated/0/Music")
//!     .build()?;
//!
//! let core = CoreService::bootstrap(config).await?;
//! core.scan_library().await?;
//! ```

pub mod error;

#[cfg(feature = "desktop-shims")]
pub mod desktop;

pub use error::{CoreError, Result};

use bridge_traits::{CatalogTrack, Locator};
use bytes::Bytes;
use core_library::{
    ArtistCredit, ContentHasher, CoverArt, IngestCandidate, LibraryError, LibraryStore,
    MetadataSource, Playlist, PlaylistEntry, PlaylistManager, ScanReport, Track, TrackId,
    TrackMetadata, TrackRef,
};
use core_playback::{PlaybackController, PlaybackError, PlaybackSession};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

struct CoreComponents {
    config: CoreConfig,
    event_bus: EventBus,
    library: LibraryStore,
    playlists: PlaylistManager,
    playback: PlaybackController,
}

/// Primary façade exposed to host applications.
///
/// Cloning is cheap; all clones share the same components.
#[derive(Clone)]
pub struct CoreService {
    inner: Arc<CoreComponents>,
}

impl CoreService {
    /// Create a service from a validated configuration, with empty state.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(config.event_buffer_size);

        let library = LibraryStore::new(
            config.settings_store.clone(),
            config.byte_resolver.clone(),
        )
        .with_key(config.library_key.clone())
        .with_event_bus(event_bus.clone());

        let playlists = PlaylistManager::new(config.settings_store.clone())
            .with_key(config.playlists_key.clone())
            .with_event_bus(event_bus.clone());

        let playback = PlaybackController::new(
            config.playback_adapter.clone(),
            config.byte_resolver.clone(),
        )
        .with_event_bus(event_bus.clone());

        Ok(Self {
            inner: Arc::new(CoreComponents {
                config,
                event_bus,
                library,
                playlists,
                playback,
            }),
        })
    }

    /// Create a service and restore persisted library and playlists.
    pub async fn bootstrap(config: CoreConfig) -> Result<Self> {
        let service = Self::new(config)?;
        service.restore().await;
        Ok(service)
    }

    /// Reload library and playlists from storage; returns their counts.
    pub async fn restore(&self) -> (usize, usize) {
        let tracks = self.inner.library.restore().await;
        let playlists = self.inner.playlists.restore().await;
        info!(tracks, playlists, "Core state restored");
        (tracks, playlists)
    }

    pub fn config(&self) -> &CoreConfig {
        &self.inner.config
    }

    pub fn library(&self) -> &LibraryStore {
        &self.inner.library
    }

    pub fn playlists(&self) -> &PlaylistManager {
        &self.inner.playlists
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.inner.playback
    }

    /// Subscribe to library, playlist and playback events.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.inner.event_bus.subscribe())
    }

    // ------------------------------------------------------------------------
    // Library
    // ------------------------------------------------------------------------

    /// Check storage access, prompting once if needed.
    pub async fn ensure_storage_access(&self) -> Result<bool> {
        let prompt = &self.inner.config.permission_prompt;
        if prompt.check().await?.is_granted() {
            return Ok(true);
        }
        Ok(prompt.request().await?.is_granted())
    }

    /// Scan the configured scopes and persist the result.
    ///
    /// New tracks only become visible once the library has been written.
    ///
    /// Returns `None` when the user refused storage access; nothing is
    /// scanned in that case.
    #[instrument(skip(self))]
    pub async fn scan_library(&self) -> Result<Option<ScanReport>> {
        if !self.ensure_storage_access().await? {
            warn!("Storage access denied, library scan skipped");
            return Ok(None);
        }

        let report = self
            .inner
            .library
            .scan_and_persist(
                self.inner.config.directory_lister.as_ref(),
                &self.inner.config.library_scopes,
            )
            .await?;
        Ok(Some(report))
    }

    /// Ingest one picked file and persist the library.
    ///
    /// The track is written before it joins the in-memory library, so a
    /// failed write can simply be retried.
    ///
    /// Local sources need storage access; a refusal is reported as
    /// [`CoreError::PermissionDenied`] without touching the library.
    pub async fn ingest_file(&self, candidate: IngestCandidate) -> Result<Track> {
        if !candidate.locator.is_remote() && !self.ensure_storage_access().await? {
            return Err(CoreError::PermissionDenied(candidate.display_name()));
        }

        Ok(self.inner.library.ingest_and_persist(candidate).await?)
    }

    /// Ingest a payload the host already read (e.g. from a document picker).
    pub async fn ingest_bytes(&self, candidate: IngestCandidate, bytes: Bytes) -> Result<Track> {
        Ok(self
            .inner
            .library
            .ingest_bytes_and_persist(candidate, bytes)
            .await?)
    }

    /// Remove a track and persist. Playlists keep their references.
    pub async fn remove_track(&self, track_id: &TrackId) -> Result<bool> {
        Ok(self.inner.library.remove_and_persist(track_id).await?)
    }

    pub async fn tracks(&self) -> Vec<Track> {
        self.inner.library.list().await
    }

    // ------------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------------

    /// Play a library track.
    pub async fn play_track(&self, track_id: &TrackId) -> Result<PlaybackSession> {
        let track = self.require_track(track_id).await?;
        Ok(self.inner.playback.start(track).await?)
    }

    pub async fn pause(&self) -> Result<PlaybackSession> {
        Ok(self.inner.playback.pause().await?)
    }

    pub async fn resume(&self) -> Result<PlaybackSession> {
        Ok(self.inner.playback.resume().await?)
    }

    pub async fn toggle_pause(&self) -> Result<PlaybackSession> {
        Ok(self.inner.playback.toggle_pause().await?)
    }

    pub async fn seek(&self, fraction: f64) -> Result<PlaybackSession> {
        Ok(self.inner.playback.seek(fraction).await?)
    }

    pub async fn stop(&self) {
        self.inner.playback.stop().await
    }

    /// Pull progress; call about once a second while the player is visible.
    pub async fn tick(&self) -> PlaybackSession {
        self.inner.playback.tick().await
    }

    pub async fn now_playing(&self) -> PlaybackSession {
        self.inner.playback.snapshot().await
    }

    // ------------------------------------------------------------------------
    // Catalog search
    // ------------------------------------------------------------------------

    /// Search the streaming catalog.
    ///
    /// A blank query, a missing provider or a failed request all yield an
    /// empty list; failures are logged.
    pub async fn search(&self, query: &str) -> Vec<CatalogTrack> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let Some(provider) = &self.inner.config.search_provider else {
            debug!("No search provider configured");
            return Vec::new();
        };

        match provider.search(query).await {
            Ok(results) => {
                debug!(provider = provider.name(), count = results.len(), "Search completed");
                results
            }
            Err(e) => {
                error!(provider = provider.name(), error = %e, "Catalog search failed");
                Vec::new()
            }
        }
    }

    /// Stream a catalog preview. The track is not added to the library.
    pub async fn play_preview(&self, item: &CatalogTrack) -> Result<PlaybackSession> {
        let track = preview_track(item)?;
        Ok(self.inner.playback.start(track).await?)
    }

    // ------------------------------------------------------------------------
    // Playlists
    // ------------------------------------------------------------------------

    pub async fn create_playlist(&self, name: &str) -> Result<Playlist> {
        Ok(self.inner.playlists.create(name).await?)
    }

    /// Append a library track to the playlist at `playlist_index`.
    ///
    /// Only tracks in the library can be added. Catalog previews are
    /// transient, so their `preview:` ids report `NotFound`.
    pub async fn add_to_playlist(
        &self,
        playlist_index: usize,
        track_id: &TrackId,
    ) -> Result<Playlist> {
        let track = self.require_track(track_id).await?;
        Ok(self.inner.playlists.add_track(playlist_index, &track).await?)
    }

    pub async fn remove_from_playlist(
        &self,
        playlist_index: usize,
        track_index: usize,
    ) -> Result<TrackRef> {
        Ok(self
            .inner
            .playlists
            .remove_track(playlist_index, track_index)
            .await?)
    }

    pub async fn delete_playlist(&self, playlist_index: usize) -> Result<Playlist> {
        Ok(self.inner.playlists.delete(playlist_index).await?)
    }

    pub async fn list_playlists(&self) -> Vec<Playlist> {
        self.inner.playlists.list().await
    }

    /// A playlist's entries resolved against the current library.
    pub async fn playlist_entries(&self, playlist_index: usize) -> Result<Vec<PlaylistEntry>> {
        Ok(self
            .inner
            .playlists
            .resolve(playlist_index, &self.inner.library)
            .await?)
    }

    async fn require_track(&self, track_id: &TrackId) -> Result<Track> {
        self.inner
            .library
            .get(track_id)
            .await
            .ok_or_else(|| {
                LibraryError::NotFound {
                    entity_type: "track".to_string(),
                    id: track_id.to_string(),
                }
                .into()
            })
    }
}

/// Transient track for a catalog preview, keyed by its preview URL.
fn preview_track(item: &CatalogTrack) -> Result<Track> {
    let url = item
        .preview_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            PlaybackError::SourceUnavailable(format!("'{}' has no preview", item.title))
        })?;

    let content_hash = ContentHasher::new().hash(url.as_bytes());
    Ok(Track {
        id: TrackId::new(format!("preview:{}", item.id)),
        display_name: item.title.clone(),
        locator: Locator::remote(url),
        size_bytes: 0,
        last_modified: None,
        content_hash,
        metadata: TrackMetadata {
            title: item.title.clone(),
            artist: ArtistCredit::from_tag(Some(&item.artist)),
            cover: item
                .cover
                .clone()
                .map(CoverArt::Reference)
                .unwrap_or_default(),
            source: MetadataSource::Tags,
        },
        added_at: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(preview: Option<&str>) -> CatalogTrack {
        CatalogTrack {
            id: "3135556".into(),
            title: "Harder, Better, Faster, Stronger".into(),
            artist: "Daft Punk".into(),
            album: "Discovery".into(),
            cover: Some("https://e-cdns-images.dzcdn.net/cover.jpg".into()),
            preview_url: preview.map(str::to_string),
        }
    }

    #[test]
    fn test_preview_track_shape() {
        let track = preview_track(&catalog(Some("https://cdn.example.com/p.mp3"))).unwrap();

        assert_eq!(track.id.as_str(), "preview:3135556");
        assert!(matches!(
            track.locator,
            Locator::Remote { ref url } if url == "https://cdn.example.com/p.mp3"
        ));
        assert_eq!(track.artist_label(), "Daft Punk");
        assert_eq!(track.cover_uri(), "https://e-cdns-images.dzcdn.net/cover.jpg");
    }

    #[test]
    fn test_preview_without_url() {
        assert!(matches!(
            preview_track(&catalog(None)),
            Err(CoreError::Playback(PlaybackError::SourceUnavailable(_)))
        ));
        assert!(preview_track(&catalog(Some(" "))).is_err());
    }
}
