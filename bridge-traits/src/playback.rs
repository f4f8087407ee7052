//! Playback bridge trait and supporting audio types.
//!
//! The core never decodes audio. It hands an [`AudioSource`] to the host's
//! [`PlaybackAdapter`] (an `<audio>` element, `MediaPlayer`, `AVPlayer`, ...)
//! and drives it through the session id the adapter returns.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use crate::error::Result;

/// High-level audio source descriptor provided to playback adapters.
#[derive(Clone)]
pub enum AudioSource {
    /// Local file accessible to the host runtime.
    LocalFile { path: PathBuf },
    /// Remote HTTP(S) stream to be fetched by the host.
    RemoteStream {
        url: String,
        headers: HashMap<String, String>,
    },
    /// In-memory audio buffer supplied by the caller.
    MemoryBuffer { data: Bytes },
}

impl AudioSource {
    pub fn remote(url: impl Into<String>) -> Self {
        AudioSource::RemoteStream {
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    /// Determine whether the source represents remote content.
    pub fn is_remote(&self) -> bool {
        matches!(self, AudioSource::RemoteStream { .. })
    }

    /// Short label for logs. Never includes buffer contents.
    pub fn kind(&self) -> &'static str {
        match self {
            AudioSource::LocalFile { .. } => "local_file",
            AudioSource::RemoteStream { .. } => "remote_stream",
            AudioSource::MemoryBuffer { .. } => "memory_buffer",
        }
    }
}

impl std::fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioSource::LocalFile { path } => {
                f.debug_struct("LocalFile").field("path", path).finish()
            }
            AudioSource::RemoteStream { url, headers } => f
                .debug_struct("RemoteStream")
                .field("url", url)
                .field("headers", &headers.len())
                .finish(),
            AudioSource::MemoryBuffer { data } => f
                .debug_struct("MemoryBuffer")
                .field("len", &data.len())
                .finish(),
        }
    }
}

/// Unique identifier for playback sessions managed by a host adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackSessionId(Uuid);

impl PlaybackSessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlaybackSessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// The adapter's view of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterState {
    /// Source accepted, metadata (duration) not yet known.
    Preparing,
    Playing,
    Paused,
    Stopped,
    /// Reached the natural end of the stream.
    Completed,
    Error { message: String },
}

/// Display metadata forwarded to platform media sessions / lock screen.
#[derive(Debug, Clone, Default)]
pub struct PlaybackMetadata {
    pub track_id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Artwork reference (URL or bundled asset path).
    pub artwork: Option<String>,
}

/// Request describing the playback session a host adapter should provision.
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    pub source: AudioSource,
    pub metadata: PlaybackMetadata,
}

impl PlaybackRequest {
    pub fn new(source: AudioSource) -> Self {
        Self {
            source,
            metadata: PlaybackMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: PlaybackMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Trait for platform-specific playback adapters that drive native audio engines.
#[async_trait]
pub trait PlaybackAdapter: Send + Sync {
    /// Prepare a playback session. Fails when the platform cannot open the
    /// source at all.
    async fn prepare(&self, request: PlaybackRequest) -> Result<PlaybackSessionId>;

    /// Total duration, `None` until the platform has loaded metadata.
    async fn duration(&self, session: PlaybackSessionId) -> Result<Option<Duration>>;

    /// Begin or resume playback for the provided session.
    async fn play(&self, session: PlaybackSessionId) -> Result<()>;

    /// Pause playback without releasing the session.
    async fn pause(&self, session: PlaybackSessionId) -> Result<()>;

    /// Stop playback and reset position to the start of the stream.
    async fn stop(&self, session: PlaybackSessionId) -> Result<()>;

    /// Seek to an absolute position within the stream.
    async fn seek(&self, session: PlaybackSessionId, position: Duration) -> Result<()>;

    /// Query the current playback position.
    async fn position(&self, session: PlaybackSessionId) -> Result<Duration>;

    /// Fetch the adapter's current understanding of the session state.
    async fn state(&self, session: PlaybackSessionId) -> Result<AdapterState>;

    /// Release resources associated with a playback session.
    async fn unload(&self, session: PlaybackSessionId) -> Result<()>;
}
