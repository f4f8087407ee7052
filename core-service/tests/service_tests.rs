//! End-to-end tests for the core service façade

use async_trait::async_trait;
use bridge_desktop::{SqliteSettingsStore, TokioFileSystem};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    AdapterState, CatalogTrack, DirectoryEntry, DirectoryLister, Locator, PermissionPrompt,
    PermissionStatus, PlaybackAdapter, PlaybackRequest, PlaybackSessionId, SearchProvider,
};
use bytes::Bytes;
use core_library::{IngestCandidate, LibraryError};
use core_playback::PlaybackState;
use core_runtime::config::CoreConfig;
use core_service::{CoreError, CoreService};
use mockall::mock;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

// ============================================================================
// Test doubles
// ============================================================================

/// Audio element that accepts everything and reports a 30 second clip.
#[derive(Default)]
struct SilentAdapter;

#[async_trait]
impl PlaybackAdapter for SilentAdapter {
    async fn prepare(&self, _: PlaybackRequest) -> BridgeResult<PlaybackSessionId> {
        Ok(PlaybackSessionId::new())
    }
    async fn duration(&self, _: PlaybackSessionId) -> BridgeResult<Option<Duration>> {
        Ok(Some(Duration::from_secs(30)))
    }
    async fn play(&self, _: PlaybackSessionId) -> BridgeResult<()> {
        Ok(())
    }
    async fn pause(&self, _: PlaybackSessionId) -> BridgeResult<()> {
        Ok(())
    }
    async fn stop(&self, _: PlaybackSessionId) -> BridgeResult<()> {
        Ok(())
    }
    async fn seek(&self, _: PlaybackSessionId, _: Duration) -> BridgeResult<()> {
        Ok(())
    }
    async fn position(&self, _: PlaybackSessionId) -> BridgeResult<Duration> {
        Ok(Duration::ZERO)
    }
    async fn state(&self, _: PlaybackSessionId) -> BridgeResult<AdapterState> {
        Ok(AdapterState::Playing)
    }
    async fn unload(&self, _: PlaybackSessionId) -> BridgeResult<()> {
        Ok(())
    }
}

mock! {
    Prompt {}

    #[async_trait]
    impl PermissionPrompt for Prompt {
        async fn check(&self) -> BridgeResult<PermissionStatus>;
        async fn request(&self) -> BridgeResult<PermissionStatus>;
    }
}

mock! {
    Lister {}

    #[async_trait]
    impl DirectoryLister for Lister {
        async fn list(&self, dir: &Path) -> BridgeResult<Vec<DirectoryEntry>>;
    }
}

/// Search provider answering every query with a fixed outcome.
struct ScriptedSearch {
    outcome: fn() -> BridgeResult<Vec<CatalogTrack>>,
    calls: AtomicUsize,
}

impl ScriptedSearch {
    fn new(outcome: fn() -> BridgeResult<Vec<CatalogTrack>>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearch {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn search(&self, _query: &str) -> BridgeResult<Vec<CatalogTrack>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.outcome)()
    }
}

fn granted() -> MockPrompt {
    let mut prompt = MockPrompt::new();
    prompt
        .expect_check()
        .returning(|| Ok(PermissionStatus::Granted));
    prompt
}

async fn config(
    settings: Arc<SqliteSettingsStore>,
    scope: PathBuf,
    prompt: MockPrompt,
) -> CoreConfig {
    CoreConfig::builder()
        .settings_store(settings)
        .playback_adapter(Arc::new(SilentAdapter))
        .byte_resolver(Arc::new(TokioFileSystem::new()))
        .directory_lister(Arc::new(TokioFileSystem::new()))
        .permission_prompt(Arc::new(prompt))
        .library_scope(scope)
        .build()
        .unwrap()
}

async fn settings() -> Arc<SqliteSettingsStore> {
    Arc::new(SqliteSettingsStore::in_memory().await.unwrap())
}

fn music_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("My_Song.mp3"), vec![1u8; 500]).unwrap();
    std::fs::write(dir.path().join("Other-Song.flac"), vec![2u8; 700]).unwrap();
    std::fs::write(dir.path().join("copy.mp3"), vec![1u8; 500]).unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
    dir
}

// ============================================================================
// Library
// ============================================================================

#[tokio::test]
async fn test_scan_persists_and_restores_across_instances() {
    let dir = music_dir();
    let settings = settings().await;

    let core = CoreService::new(config(settings.clone(), dir.path().to_path_buf(), granted()).await)
        .unwrap();
    let report = core.scan_library().await.unwrap().unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.skipped, 1);

    let fresh = CoreService::bootstrap(config(settings, dir.path().to_path_buf(), granted()).await)
        .await
        .unwrap();
    let names: Vec<_> = fresh
        .tracks()
        .await
        .into_iter()
        .map(|t| t.display_name)
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"My Song".to_string()));
    assert!(names.contains(&"Other Song".to_string()));
}

#[tokio::test]
async fn test_denied_permission_halts_scan() {
    let dir = music_dir();
    let mut prompt = MockPrompt::new();
    prompt
        .expect_check()
        .times(1)
        .returning(|| Ok(PermissionStatus::Denied));
    prompt
        .expect_request()
        .times(1)
        .returning(|| Ok(PermissionStatus::Denied));

    let mut lister = MockLister::new();
    lister.expect_list().never();

    let config = CoreConfig::builder()
        .settings_store(settings().await)
        .playback_adapter(Arc::new(SilentAdapter))
        .byte_resolver(Arc::new(TokioFileSystem::new()))
        .directory_lister(Arc::new(lister))
        .permission_prompt(Arc::new(prompt))
        .library_scope(dir.path())
        .build()
        .unwrap();

    let core = CoreService::new(config).unwrap();
    assert!(core.scan_library().await.unwrap().is_none());
    assert!(core.tracks().await.is_empty());
}

#[tokio::test]
async fn test_prompt_granting_on_request_allows_scan() {
    let dir = music_dir();
    let mut prompt = MockPrompt::new();
    prompt
        .expect_check()
        .returning(|| Ok(PermissionStatus::Denied));
    prompt
        .expect_request()
        .times(1)
        .returning(|| Ok(PermissionStatus::Granted));

    let core =
        CoreService::new(config(settings().await, dir.path().to_path_buf(), prompt).await).unwrap();
    assert_eq!(core.scan_library().await.unwrap().unwrap().added, 2);
}

#[tokio::test]
async fn test_duplicate_ingest_reaches_caller() {
    let dir = music_dir();
    let core = CoreService::new(config(settings().await, dir.path().to_path_buf(), granted()).await)
        .unwrap();

    let first = core
        .ingest_file(IngestCandidate::new(
            Locator::file(dir.path().join("My_Song.mp3")),
            500,
        ))
        .await
        .unwrap();
    assert_eq!(first.display_name, "My Song");

    let err = core
        .ingest_file(IngestCandidate::new(
            Locator::file(dir.path().join("copy.mp3")),
            500,
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Library(LibraryError::Duplicate { .. })));
    assert_eq!(core.tracks().await.len(), 1);
}

#[tokio::test]
async fn test_refused_access_blocks_file_ingest() {
    let dir = music_dir();
    let mut prompt = MockPrompt::new();
    prompt
        .expect_check()
        .returning(|| Ok(PermissionStatus::Denied));
    prompt
        .expect_request()
        .returning(|| Ok(PermissionStatus::Denied));

    let core =
        CoreService::new(config(settings().await, dir.path().to_path_buf(), prompt).await).unwrap();
    let err = core
        .ingest_file(IngestCandidate::new(
            Locator::file(dir.path().join("My_Song.mp3")),
            500,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::PermissionDenied(ref name) if name == "My Song"));
    assert!(core.tracks().await.is_empty());
}

/// Reads find nothing, every write fails.
struct FullDisk;

#[async_trait]
impl bridge_traits::SettingsStore for FullDisk {
    async fn set_string(&self, _: &str, _: &str) -> BridgeResult<()> {
        Err(BridgeError::OperationFailed("disk full".into()))
    }
    async fn get_string(&self, _: &str) -> BridgeResult<Option<String>> {
        Ok(None)
    }
    async fn delete(&self, _: &str) -> BridgeResult<()> {
        Ok(())
    }
    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        Ok(Vec::new())
    }
    async fn clear_all(&self) -> BridgeResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_failed_write_can_be_retried() {
    let dir = music_dir();
    let config = CoreConfig::builder()
        .settings_store(Arc::new(FullDisk))
        .playback_adapter(Arc::new(SilentAdapter))
        .byte_resolver(Arc::new(TokioFileSystem::new()))
        .directory_lister(Arc::new(TokioFileSystem::new()))
        .permission_prompt(Arc::new(granted()))
        .library_scope(dir.path().to_path_buf())
        .build()
        .unwrap();
    let core = CoreService::new(config).unwrap();

    for _ in 0..2 {
        let err = core
            .ingest_bytes(
                IngestCandidate::new(Locator::handle("Picked.mp3", "content://7"), 4),
                Bytes::from_static(b"abcd"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Library(LibraryError::Storage(_))));
    }
    assert!(core.tracks().await.is_empty());

    let err = core.scan_library().await.unwrap_err();
    assert!(matches!(err, CoreError::Library(LibraryError::Storage(_))));
    assert!(core.tracks().await.is_empty());
}

// ============================================================================
// Playback and playlists
// ============================================================================

#[tokio::test]
async fn test_play_track_and_playlist_round_trip() {
    let dir = music_dir();
    let settings = settings().await;
    let core = CoreService::new(config(settings.clone(), dir.path().to_path_buf(), granted()).await)
        .unwrap();

    let track = core
        .ingest_bytes(
            IngestCandidate::new(Locator::handle("Picked.mp3", "content://7"), 4),
            Bytes::from_static(b"abcd"),
        )
        .await
        .unwrap();

    let session = core.play_track(&track.id).await.unwrap();
    assert_eq!(session.state, PlaybackState::Playing);

    core.create_playlist("Gym").await.unwrap();
    core.add_to_playlist(0, &track.id).await.unwrap();

    assert!(core.remove_track(&track.id).await.unwrap());
    let entries = core.playlist_entries(0).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_missing());
    assert_eq!(entries[0].display_name(), "Picked");

    let fresh = CoreService::bootstrap(config(settings, dir.path().to_path_buf(), granted()).await)
        .await
        .unwrap();
    let playlists = fresh.list_playlists().await;
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].name, "Gym");
    assert!(playlists[0].contains(&track.id));
    assert!(fresh.tracks().await.is_empty());
}

#[tokio::test]
async fn test_unknown_track_is_not_found() {
    let dir = music_dir();
    let core = CoreService::new(config(settings().await, dir.path().to_path_buf(), granted()).await)
        .unwrap();

    let err = core
        .play_track(&core_library::TrackId::new("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Library(LibraryError::NotFound { .. })));
}

// ============================================================================
// Search
// ============================================================================

fn daft_punk() -> CatalogTrack {
    CatalogTrack {
        id: "3135556".into(),
        title: "Harder, Better, Faster, Stronger".into(),
        artist: "Daft Punk".into(),
        album: "Discovery".into(),
        cover: None,
        preview_url: Some("https://cdns-preview-d.dzcdn.net/stream/c-deda7f.mp3".into()),
    }
}

fn core_with_search(search: Arc<ScriptedSearch>) -> CoreService {
    let config = CoreConfig::builder()
        .settings_store(Arc::new(NoopSettings))
        .playback_adapter(Arc::new(SilentAdapter))
        .byte_resolver(Arc::new(TokioFileSystem::new()))
        .directory_lister(Arc::new(TokioFileSystem::new()))
        .permission_prompt(Arc::new(granted()))
        .search_provider(search)
        .build()
        .unwrap();
    CoreService::new(config).unwrap()
}

struct NoopSettings;

#[async_trait]
impl bridge_traits::SettingsStore for NoopSettings {
    async fn set_string(&self, _: &str, _: &str) -> BridgeResult<()> {
        Ok(())
    }
    async fn get_string(&self, _: &str) -> BridgeResult<Option<String>> {
        Ok(None)
    }
    async fn delete(&self, _: &str) -> BridgeResult<()> {
        Ok(())
    }
    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        Ok(Vec::new())
    }
    async fn clear_all(&self) -> BridgeResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_blank_search_skips_provider() {
    let search = ScriptedSearch::new(|| Ok(vec![daft_punk()]));
    let core = core_with_search(search.clone());

    assert!(core.search("   ").await.is_empty());
    assert_eq!(search.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_search_is_empty() {
    let search = ScriptedSearch::new(|| Err(BridgeError::OperationFailed("503".into())));
    let core = core_with_search(search.clone());

    assert!(core.search("daft punk").await.is_empty());
    assert_eq!(search.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_preview_cannot_join_playlist() {
    let core = core_with_search(ScriptedSearch::new(|| Ok(vec![daft_punk()])));
    core.create_playlist("Later").await.unwrap();

    let err = core
        .add_to_playlist(0, &core_library::TrackId::new("preview:3135556"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Library(LibraryError::NotFound { .. })));
    assert!(core.list_playlists().await[0].tracks.is_empty());
}

#[tokio::test]
async fn test_preview_plays_without_touching_library() {
    let core = core_with_search(ScriptedSearch::new(|| Ok(vec![daft_punk()])));
    let results = core.search("daft punk").await;
    assert_eq!(results.len(), 1);

    let session = core.play_preview(&results[0]).await.unwrap();
    assert_eq!(session.state, PlaybackState::Playing);
    assert_eq!(
        session.track.unwrap().locator,
        Locator::remote("https://cdns-preview-d.dzcdn.net/stream/c-deda7f.mp3")
    );
    assert!(core.tracks().await.is_empty());
}
