//! Tests for the playback controller state machine
//!
//! The recording adapter below stands in for the platform audio element; a
//! mockall adapter covers the source fallback ordering.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    AdapterState, AudioSource, ByteSourceResolver, Locator, PlaybackAdapter, PlaybackRequest,
    PlaybackSessionId,
};
use bytes::Bytes;
use core_library::{ContentHash, Track, TrackId, TrackMetadata};
use core_playback::{PlaybackController, PlaybackError, PlaybackState};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use mockall::mock;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Recording adapter
// ============================================================================

#[derive(Default)]
struct Recorded {
    live: HashSet<PlaybackSessionId>,
    prepared: Vec<String>,
    seeks: Vec<Duration>,
    position: Duration,
    adapter_state: Option<AdapterState>,
    reject_memory_buffers: bool,
    reject_all: bool,
}

struct RecordingAdapter {
    inner: Mutex<Recorded>,
    duration: Option<Duration>,
}

impl RecordingAdapter {
    fn new(duration: Option<Duration>) -> Self {
        Self {
            inner: Mutex::new(Recorded::default()),
            duration,
        }
    }

    fn live_sessions(&self) -> usize {
        self.inner.lock().unwrap().live.len()
    }

    fn set_position(&self, position: Duration) {
        self.inner.lock().unwrap().position = position;
    }

    fn set_state(&self, state: AdapterState) {
        self.inner.lock().unwrap().adapter_state = Some(state);
    }
}

#[async_trait]
impl PlaybackAdapter for RecordingAdapter {
    async fn prepare(&self, request: PlaybackRequest) -> BridgeResult<PlaybackSessionId> {
        let mut inner = self.inner.lock().unwrap();
        inner.prepared.push(request.source.kind().to_string());
        let memory = matches!(request.source, AudioSource::MemoryBuffer { .. });
        if inner.reject_all || (memory && inner.reject_memory_buffers) {
            return Err(BridgeError::OperationFailed("unsupported source".into()));
        }
        let id = PlaybackSessionId::new();
        inner.live.insert(id);
        inner.position = Duration::ZERO;
        inner.adapter_state = None;
        Ok(id)
    }

    async fn duration(&self, _session: PlaybackSessionId) -> BridgeResult<Option<Duration>> {
        Ok(self.duration)
    }

    async fn play(&self, _session: PlaybackSessionId) -> BridgeResult<()> {
        Ok(())
    }

    async fn pause(&self, _session: PlaybackSessionId) -> BridgeResult<()> {
        Ok(())
    }

    async fn stop(&self, _session: PlaybackSessionId) -> BridgeResult<()> {
        Ok(())
    }

    async fn seek(&self, _session: PlaybackSessionId, position: Duration) -> BridgeResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.seeks.push(position);
        inner.position = position;
        Ok(())
    }

    async fn position(&self, _session: PlaybackSessionId) -> BridgeResult<Duration> {
        Ok(self.inner.lock().unwrap().position)
    }

    async fn state(&self, _session: PlaybackSessionId) -> BridgeResult<AdapterState> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .adapter_state
            .clone()
            .unwrap_or(AdapterState::Playing))
    }

    async fn unload(&self, session: PlaybackSessionId) -> BridgeResult<()> {
        self.inner.lock().unwrap().live.remove(&session);
        Ok(())
    }
}

struct StaticResolver;

#[async_trait]
impl ByteSourceResolver for StaticResolver {
    async fn resolve(&self, locator: &Locator) -> BridgeResult<Bytes> {
        match locator {
            Locator::File { path } if path.ends_with("missing.mp3") => {
                Err(BridgeError::NotFound(locator.base_name()))
            }
            _ => Ok(Bytes::from_static(b"ID3audio")),
        }
    }
}

fn track(name: &str, locator: Locator) -> Track {
    Track {
        id: TrackId::new(format!("hash-{name}")),
        display_name: name.to_string(),
        locator,
        size_bytes: 8,
        last_modified: None,
        content_hash: ContentHash::from_hex(format!("hash-{name}")),
        metadata: TrackMetadata::from_file_name(name),
        added_at: 0,
    }
}

fn file_track(name: &str) -> Track {
    track(name, Locator::file(format!("/music/{name}.mp3")))
}

fn controller(adapter: Arc<RecordingAdapter>) -> PlaybackController {
    PlaybackController::new(adapter, Arc::new(StaticResolver))
}

// ============================================================================
// State machine
// ============================================================================

#[tokio::test]
async fn test_start_plays_from_resolved_bytes() {
    let adapter = Arc::new(RecordingAdapter::new(Some(Duration::from_secs(200))));
    let controller = controller(adapter.clone());

    let session = controller.start(file_track("A")).await.unwrap();

    assert_eq!(session.state, PlaybackState::Playing);
    assert_eq!(session.position_seconds, 0.0);
    assert_eq!(session.duration_seconds, Some(200.0));
    assert_eq!(adapter.inner.lock().unwrap().prepared, vec!["memory_buffer"]);
}

#[tokio::test]
async fn test_starting_b_replaces_a() {
    let adapter = Arc::new(RecordingAdapter::new(Some(Duration::from_secs(200))));
    let controller = controller(adapter.clone());

    controller.start(file_track("A")).await.unwrap();
    adapter.set_position(Duration::from_secs(42));
    let session = controller.start(file_track("B")).await.unwrap();

    assert_eq!(adapter.live_sessions(), 1);
    assert_eq!(session.track.unwrap().display_name, "B");
    assert_eq!(session.position_seconds, 0.0);
}

#[tokio::test]
async fn test_concurrent_starts_leave_one_session() {
    let adapter = Arc::new(RecordingAdapter::new(Some(Duration::from_secs(60))));
    let controller = Arc::new(controller(adapter.clone()));

    let a = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.start(file_track("A")).await })
    };
    let b = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.start(file_track("B")).await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(adapter.live_sessions(), 1);
    assert_eq!(controller.snapshot().await.state, PlaybackState::Playing);
}

#[tokio::test]
async fn test_toggle_pause_while_idle_is_noop() {
    let adapter = Arc::new(RecordingAdapter::new(None));
    let controller = controller(adapter);

    let session = controller.toggle_pause().await.unwrap();
    assert_eq!(session.state, PlaybackState::Idle);
    assert!(session.track.is_none());
}

#[tokio::test]
async fn test_toggle_pause_round_trip() {
    let adapter = Arc::new(RecordingAdapter::new(Some(Duration::from_secs(100))));
    let controller = controller(adapter.clone());
    controller.start(file_track("A")).await.unwrap();

    adapter.set_position(Duration::from_secs(12));
    let paused = controller.toggle_pause().await.unwrap();
    assert_eq!(paused.state, PlaybackState::Paused);
    assert_eq!(paused.position_seconds, 12.0);

    let resumed = controller.toggle_pause().await.unwrap();
    assert_eq!(resumed.state, PlaybackState::Playing);

    // Explicit resume while playing does nothing
    assert_eq!(controller.resume().await.unwrap().state, PlaybackState::Playing);
}

#[tokio::test]
async fn test_seek_clamps_to_unit_range() {
    let adapter = Arc::new(RecordingAdapter::new(Some(Duration::from_secs(200))));
    let controller = controller(adapter.clone());
    controller.start(file_track("A")).await.unwrap();

    let high = controller.seek(1.5).await.unwrap();
    assert_eq!(high.position_seconds, 200.0);

    let low = controller.seek(-0.2).await.unwrap();
    assert_eq!(low.position_seconds, 0.0);

    let mid = controller.seek(0.25).await.unwrap();
    assert_eq!(mid.position_seconds, 50.0);

    let seeks = adapter.inner.lock().unwrap().seeks.clone();
    assert_eq!(
        seeks,
        vec![
            Duration::from_secs(200),
            Duration::ZERO,
            Duration::from_secs(50)
        ]
    );
}

#[tokio::test]
async fn test_seek_ignores_nan_and_unknown_duration() {
    let adapter = Arc::new(RecordingAdapter::new(None));
    let controller = controller(adapter.clone());
    controller.start(file_track("Stream")).await.unwrap();

    controller.seek(0.5).await.unwrap();
    controller.seek(f64::NAN).await.unwrap();
    controller.seek(f64::INFINITY).await.unwrap();

    assert!(adapter.inner.lock().unwrap().seeks.is_empty());

    // Idle controller
    let idle = PlaybackController::new(
        Arc::new(RecordingAdapter::new(None)),
        Arc::new(StaticResolver),
    );
    assert_eq!(idle.seek(0.5).await.unwrap().state, PlaybackState::Idle);
}

#[tokio::test]
async fn test_natural_end_then_idle_on_next_tick() {
    let bus = EventBus::new(32);
    let mut events = bus.subscribe();
    let adapter = Arc::new(RecordingAdapter::new(Some(Duration::from_secs(30))));
    let controller = controller(adapter.clone()).with_event_bus(bus);
    controller.start(file_track("A")).await.unwrap();

    adapter.set_position(Duration::from_secs(10));
    let progress = controller.tick().await;
    assert_eq!(progress.state, PlaybackState::Playing);
    assert_eq!(progress.position_seconds, 10.0);

    adapter.set_state(AdapterState::Completed);
    let ended = controller.tick().await;
    assert_eq!(ended.state, PlaybackState::Ended);
    assert_eq!(ended.position_seconds, 30.0);

    let idle = controller.tick().await;
    assert_eq!(idle.state, PlaybackState::Idle);
    assert_eq!(adapter.live_sessions(), 0);

    let mut completed = false;
    while let Ok(event) = events.try_recv() {
        if matches!(event, CoreEvent::Playback(PlaybackEvent::Completed { .. })) {
            completed = true;
        }
    }
    assert!(completed);
}

#[tokio::test]
async fn test_tick_does_not_refresh_while_paused() {
    let adapter = Arc::new(RecordingAdapter::new(Some(Duration::from_secs(30))));
    let controller = controller(adapter.clone());
    controller.start(file_track("A")).await.unwrap();

    adapter.set_position(Duration::from_secs(5));
    controller.pause().await.unwrap();
    adapter.set_position(Duration::from_secs(20));

    let session = controller.tick().await;
    assert_eq!(session.state, PlaybackState::Paused);
    assert_eq!(session.position_seconds, 5.0);
}

#[tokio::test]
async fn test_stop_is_always_safe() {
    let adapter = Arc::new(RecordingAdapter::new(Some(Duration::from_secs(30))));
    let controller = controller(adapter.clone());

    controller.stop().await;
    assert_eq!(controller.snapshot().await.state, PlaybackState::Idle);

    controller.start(file_track("A")).await.unwrap();
    controller.stop().await;
    controller.stop().await;

    assert_eq!(controller.snapshot().await.state, PlaybackState::Idle);
    assert_eq!(adapter.live_sessions(), 0);
    assert!(controller.now_playing().await.is_none());
}

// ============================================================================
// Source selection and failures
// ============================================================================

#[tokio::test]
async fn test_falls_back_to_direct_file_path() {
    let adapter = Arc::new(RecordingAdapter::new(Some(Duration::from_secs(30))));
    adapter.inner.lock().unwrap().reject_memory_buffers = true;
    let controller = controller(adapter.clone());

    let session = controller.start(file_track("A")).await.unwrap();

    assert_eq!(session.state, PlaybackState::Playing);
    assert_eq!(
        adapter.inner.lock().unwrap().prepared,
        vec!["memory_buffer", "local_file"]
    );
}

#[tokio::test]
async fn test_unreadable_file_still_tries_direct_path() {
    let adapter = Arc::new(RecordingAdapter::new(Some(Duration::from_secs(30))));
    let controller = controller(adapter.clone());

    let session = controller.start(file_track("missing")).await.unwrap();

    assert_eq!(session.state, PlaybackState::Playing);
    assert_eq!(adapter.inner.lock().unwrap().prepared, vec!["local_file"]);
}

#[tokio::test]
async fn test_both_sources_failing_returns_to_idle() {
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let adapter = Arc::new(RecordingAdapter::new(Some(Duration::from_secs(30))));
    adapter.inner.lock().unwrap().reject_all = true;
    let controller = controller(adapter.clone()).with_event_bus(bus);

    let err = controller.start(file_track("A")).await.unwrap_err();

    assert!(matches!(err, PlaybackError::PlaybackFailed(_)));
    assert_eq!(controller.snapshot().await.state, PlaybackState::Idle);
    assert!(matches!(
        events.recv().await.unwrap(),
        CoreEvent::Playback(PlaybackEvent::Error { .. })
    ));
}

#[tokio::test]
async fn test_remote_and_embedded_sources() {
    let adapter = Arc::new(RecordingAdapter::new(None));
    let controller = controller(adapter.clone());

    controller
        .start(track("Preview", Locator::remote("https://cdn.example.com/p.mp3")))
        .await
        .unwrap();
    controller
        .start(track(
            "Picked",
            Locator::embedded("Picked.mp3", Bytes::from_static(b"abc")),
        ))
        .await
        .unwrap();

    assert_eq!(
        adapter.inner.lock().unwrap().prepared,
        vec!["remote_stream", "memory_buffer"]
    );
}

// ============================================================================
// mockall: no fallback when the direct source equals the primary
// ============================================================================

mock! {
    Adapter {}

    #[async_trait]
    impl PlaybackAdapter for Adapter {
        async fn prepare(&self, request: PlaybackRequest) -> BridgeResult<PlaybackSessionId>;
        async fn duration(&self, session: PlaybackSessionId) -> BridgeResult<Option<Duration>>;
        async fn play(&self, session: PlaybackSessionId) -> BridgeResult<()>;
        async fn pause(&self, session: PlaybackSessionId) -> BridgeResult<()>;
        async fn stop(&self, session: PlaybackSessionId) -> BridgeResult<()>;
        async fn seek(&self, session: PlaybackSessionId, position: Duration) -> BridgeResult<()>;
        async fn position(&self, session: PlaybackSessionId) -> BridgeResult<Duration>;
        async fn state(&self, session: PlaybackSessionId) -> BridgeResult<AdapterState>;
        async fn unload(&self, session: PlaybackSessionId) -> BridgeResult<()>;
    }
}

#[tokio::test]
async fn test_remote_source_gets_a_single_attempt() {
    let mut adapter = MockAdapter::new();
    adapter
        .expect_prepare()
        .times(1)
        .returning(|_| Err(BridgeError::NotAvailable("network".into())));

    let controller = PlaybackController::new(Arc::new(adapter), Arc::new(StaticResolver));
    let result = controller
        .start(track("Preview", Locator::remote("https://cdn.example.com/p.mp3")))
        .await;

    assert!(result.is_err());
    assert_eq!(controller.snapshot().await.state, PlaybackState::Idle);
}

#[tokio::test]
async fn test_failed_play_unloads_prepared_session() {
    let mut adapter = MockAdapter::new();
    adapter
        .expect_prepare()
        .times(1)
        .returning(|_| Ok(PlaybackSessionId::new()));
    adapter.expect_duration().returning(|_| Ok(None));
    adapter
        .expect_play()
        .returning(|_| Err(BridgeError::OperationFailed("decoder".into())));
    adapter.expect_unload().times(1).returning(|_| Ok(()));

    let controller = PlaybackController::new(Arc::new(adapter), Arc::new(StaticResolver));
    let result = controller
        .start(track(
            "Picked",
            Locator::embedded("Picked.mp3", Bytes::from_static(b"abc")),
        ))
        .await;

    assert!(matches!(result, Err(PlaybackError::PlaybackFailed(_))));
}
