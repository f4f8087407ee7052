//! # Playback Controller
//!
//! Owns the single active audio session and drives the platform's
//! [`PlaybackAdapter`] through it.
//!
//! ## Source selection
//!
//! The primary source is the track's resolved bytes: files and handles go
//! through the [`ByteSourceResolver`], embedded payloads are used directly
//! and remote tracks are streamed. If the platform rejects the primary
//! source, one fallback is tried with the direct file path when that differs.
//!
//! ## Progress
//!
//! Nothing runs in the background. The presentation layer calls
//! [`PlaybackController::tick`] on its own cadence (about once a second) to
//! refresh the position and notice the natural end of a track.
//!
//! ## Concurrency
//!
//! Every operation holds one async mutex across its adapter calls, so the
//! teardown of a previous session always completes before the next one is
//! prepared.

use crate::error::{PlaybackError, Result};
use crate::session::{PlaybackSession, PlaybackState};
use bridge_traits::{
    AdapterState, AudioSource, ByteSourceResolver, Locator, PlaybackAdapter, PlaybackMetadata,
    PlaybackRequest, PlaybackSessionId,
};
use core_library::Track;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

#[derive(Default)]
struct ControllerState {
    session: PlaybackSession,
    handle: Option<PlaybackSessionId>,
}

pub struct PlaybackController {
    adapter: Arc<dyn PlaybackAdapter>,
    resolver: Arc<dyn ByteSourceResolver>,
    event_bus: Option<EventBus>,
    state: Mutex<ControllerState>,
}

impl PlaybackController {
    pub fn new(adapter: Arc<dyn PlaybackAdapter>, resolver: Arc<dyn ByteSourceResolver>) -> Self {
        Self {
            adapter,
            resolver,
            event_bus: None,
            state: Mutex::new(ControllerState::default()),
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Start playing `track`, replacing whatever was loaded.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackFailed` when neither the primary nor the fallback
    /// source could be played; the session is `Idle` afterwards.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn start(&self, track: Track) -> Result<PlaybackSession> {
        let mut state = self.state.lock().await;
        self.teardown(&mut state).await;

        state.session = PlaybackSession::loading(track.clone());
        let metadata = playback_metadata(&track);

        let primary = self.primary_source(&track.locator).await;
        let fallback = direct_source(&track.locator);

        let mut last_error = match primary {
            Ok(source) => match self.attempt(source, metadata.clone()).await {
                Ok(ready) => return Ok(self.enter_playing(&mut state, &track, ready)),
                Err(e) => e,
            },
            Err(e) => e,
        };

        if let Some(source) = fallback {
            warn!(error = %last_error, "Primary source failed, trying direct source");
            match self.attempt(source, metadata).await {
                Ok(ready) => return Ok(self.enter_playing(&mut state, &track, ready)),
                Err(e) => last_error = e,
            }
        }

        error!(error = %last_error, "Playback failed");
        *state = ControllerState::default();
        self.emit(PlaybackEvent::Error {
            track_id: Some(track.id.to_string()),
            message: last_error.to_string(),
            recoverable: last_error.is_transient(),
        });

        Err(PlaybackError::PlaybackFailed(format!(
            "{}: {}",
            track.display_name, last_error
        )))
    }

    /// Pause when Playing; otherwise a no-op.
    pub async fn pause(&self) -> Result<PlaybackSession> {
        let mut state = self.state.lock().await;
        self.pause_locked(&mut state).await?;
        Ok(state.session.clone())
    }

    /// Resume when Paused; otherwise a no-op.
    pub async fn resume(&self) -> Result<PlaybackSession> {
        let mut state = self.state.lock().await;
        self.resume_locked(&mut state).await?;
        Ok(state.session.clone())
    }

    /// Pause when Playing, resume when Paused, no-op otherwise.
    pub async fn toggle_pause(&self) -> Result<PlaybackSession> {
        let mut state = self.state.lock().await;
        match state.session.state {
            PlaybackState::Playing => self.pause_locked(&mut state).await?,
            PlaybackState::Paused => self.resume_locked(&mut state).await?,
            _ => debug!(state = ?state.session.state, "Toggle ignored"),
        }
        Ok(state.session.clone())
    }

    /// Seek to `fraction` of the track, clamped to `[0, 1]`.
    ///
    /// Non-finite input, an unknown duration or no active session are no-ops.
    pub async fn seek(&self, fraction: f64) -> Result<PlaybackSession> {
        let mut state = self.state.lock().await;

        if !fraction.is_finite() {
            debug!(fraction, "Ignoring non-finite seek");
            return Ok(state.session.clone());
        }

        let (Some(handle), Some(duration)) = (state.handle, state.session.duration_seconds) else {
            return Ok(state.session.clone());
        };
        if !state.session.state.is_pausable() || duration <= 0.0 {
            return Ok(state.session.clone());
        }

        let target = fraction.clamp(0.0, 1.0) * duration;
        self.adapter
            .seek(handle, Duration::from_secs_f64(target))
            .await?;
        state.session.position_seconds = target;

        debug!(position = target, "Seeked");
        Ok(state.session.clone())
    }

    /// Stop and release the session. Always safe; a no-op when Idle.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        self.teardown(&mut state).await;
    }

    /// Refresh progress and detect the natural end.
    ///
    /// Only a Playing session is refreshed. An Ended session is released and
    /// returns to Idle.
    pub async fn tick(&self) -> PlaybackSession {
        let mut state = self.state.lock().await;

        match state.session.state {
            PlaybackState::Ended => {
                self.release(&mut state).await;
                *state = ControllerState::default();
            }
            PlaybackState::Playing => self.refresh(&mut state).await,
            _ => {}
        }

        state.session.clone()
    }

    pub async fn snapshot(&self) -> PlaybackSession {
        self.state.lock().await.session.clone()
    }

    pub async fn now_playing(&self) -> Option<Track> {
        self.state.lock().await.session.track.clone()
    }

    // ------------------------------------------------------------------------
    // Internals (callers hold the lock)
    // ------------------------------------------------------------------------

    async fn primary_source(&self, locator: &Locator) -> Result<AudioSource> {
        match locator {
            Locator::Remote { url } => Ok(AudioSource::remote(url.clone())),
            Locator::Embedded { data, .. } => Ok(AudioSource::MemoryBuffer { data: data.clone() }),
            Locator::File { .. } | Locator::Handle { .. } => {
                let data = self
                    .resolver
                    .resolve(locator)
                    .await
                    .map_err(|e| PlaybackError::SourceUnavailable(e.to_string()))?;
                Ok(AudioSource::MemoryBuffer { data })
            }
        }
    }

    /// Prepare, read the duration and start one source. A prepared session
    /// that fails to start is unloaded again.
    async fn attempt(
        &self,
        source: AudioSource,
        metadata: PlaybackMetadata,
    ) -> Result<(PlaybackSessionId, Option<f64>)> {
        debug!(source = source.kind(), "Preparing source");
        let handle = self
            .adapter
            .prepare(PlaybackRequest::new(source).with_metadata(metadata))
            .await?;

        let started = async {
            let duration = self.adapter.duration(handle).await?;
            self.adapter.play(handle).await?;
            Ok::<_, PlaybackError>(duration.map(|d| d.as_secs_f64()))
        }
        .await;

        match started {
            Ok(duration) => Ok((handle, duration)),
            Err(e) => {
                if let Err(unload_err) = self.adapter.unload(handle).await {
                    warn!(error = %unload_err, "Failed to unload rejected session");
                }
                Err(e)
            }
        }
    }

    fn enter_playing(
        &self,
        state: &mut ControllerState,
        track: &Track,
        (handle, duration): (PlaybackSessionId, Option<f64>),
    ) -> PlaybackSession {
        state.handle = Some(handle);
        state.session.state = PlaybackState::Playing;
        state.session.position_seconds = 0.0;
        state.session.duration_seconds = duration;

        info!(title = %track.title(), duration = ?duration, "Playback started");
        self.emit(PlaybackEvent::Started {
            track_id: track.id.to_string(),
            title: track.title().to_string(),
        });
        state.session.clone()
    }

    async fn pause_locked(&self, state: &mut ControllerState) -> Result<()> {
        let (PlaybackState::Playing, Some(handle)) = (state.session.state, state.handle) else {
            return Ok(());
        };

        self.adapter.pause(handle).await?;
        if let Ok(position) = self.adapter.position(handle).await {
            state.session.position_seconds = position.as_secs_f64();
        }
        state.session.state = PlaybackState::Paused;

        self.emit(PlaybackEvent::Paused {
            track_id: state.session.track_id().unwrap_or_default(),
            position_ms: state.session.position_ms(),
        });
        Ok(())
    }

    async fn resume_locked(&self, state: &mut ControllerState) -> Result<()> {
        let (PlaybackState::Paused, Some(handle)) = (state.session.state, state.handle) else {
            return Ok(());
        };

        self.adapter.play(handle).await?;
        state.session.state = PlaybackState::Playing;

        self.emit(PlaybackEvent::Resumed {
            track_id: state.session.track_id().unwrap_or_default(),
            position_ms: state.session.position_ms(),
        });
        Ok(())
    }

    async fn refresh(&self, state: &mut ControllerState) {
        let Some(handle) = state.handle else {
            return;
        };

        match self.adapter.state(handle).await {
            Ok(AdapterState::Completed) => {
                if let Some(duration) = state.session.duration_seconds {
                    state.session.position_seconds = duration;
                }
                state.session.state = PlaybackState::Ended;
                info!("Track completed");
                self.emit(PlaybackEvent::Completed {
                    track_id: state.session.track_id().unwrap_or_default(),
                });
                return;
            }
            Ok(AdapterState::Error { message }) => {
                error!(%message, "Platform reported a playback error");
                let track_id = state.session.track_id();
                self.release(state).await;
                *state = ControllerState::default();
                self.emit(PlaybackEvent::Error {
                    track_id,
                    message,
                    recoverable: true,
                });
                return;
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Could not read adapter state"),
        }

        match self.adapter.position(handle).await {
            Ok(position) => {
                let mut seconds = position.as_secs_f64();
                if let Some(duration) = state.session.duration_seconds {
                    seconds = seconds.min(duration);
                }
                state.session.position_seconds = seconds;
            }
            Err(e) => warn!(error = %e, "Could not read position"),
        }

        if state.session.duration_seconds.is_none() {
            if let Ok(Some(duration)) = self.adapter.duration(handle).await {
                state.session.duration_seconds = Some(duration.as_secs_f64());
            }
        }
    }

    /// Stop and unload the current session, emitting `Stopped` for an
    /// interrupted track, then reset to Idle.
    async fn teardown(&self, state: &mut ControllerState) {
        if state.session.state == PlaybackState::Idle && state.handle.is_none() {
            return;
        }

        let interrupted = state.session.state.is_active();
        let track_id = state.session.track_id();
        self.release(state).await;
        *state = ControllerState::default();

        if interrupted {
            if let Some(track_id) = track_id {
                debug!(%track_id, "Playback stopped");
                self.emit(PlaybackEvent::Stopped { track_id });
            }
        }
    }

    /// Release the platform session; failures are logged.
    async fn release(&self, state: &mut ControllerState) {
        let Some(handle) = state.handle.take() else {
            return;
        };

        if let Err(e) = self.adapter.stop(handle).await {
            warn!(error = %e, "Failed to stop platform session");
        }
        if let Err(e) = self.adapter.unload(handle).await {
            warn!(error = %e, "Failed to unload platform session");
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Playback(event)).ok();
        }
    }
}

/// The locator handed straight to the platform, for sources that have one.
fn direct_source(locator: &Locator) -> Option<AudioSource> {
    match locator {
        Locator::File { path } => Some(AudioSource::LocalFile { path: path.clone() }),
        _ => None,
    }
}

fn playback_metadata(track: &Track) -> PlaybackMetadata {
    PlaybackMetadata {
        track_id: Some(track.id.to_string()),
        title: Some(track.title().to_string()),
        artist: Some(track.artist_label().to_string()),
        artwork: Some(track.cover_uri().to_string()),
    }
}
