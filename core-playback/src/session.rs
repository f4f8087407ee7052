//! Playback session state
//!
//! ```text
//! Idle ──start──> Loading ──ready──> Playing <──pause/resume──> Paused
//!  ^                                    │                          │
//!  │                                natural end                    │
//!  │                                    v                          │
//!  └────────next tick──────────────── Ended                        │
//!  └──────────────────────────stop────────────────────────────────┘
//! ```

use core_library::Track;
use serde::{Deserialize, Serialize};

/// Current state of the playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing loaded.
    #[default]
    Idle,
    /// Source handed to the platform, waiting for it to become playable.
    Loading,
    Playing,
    Paused,
    /// Reached the natural end; becomes `Idle` on the next tick.
    Ended,
}

impl PlaybackState {
    /// Returns `true` if a platform session is held.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Loading | Self::Playing | Self::Paused)
    }

    /// Returns `true` if pause/resume applies.
    pub fn is_pausable(&self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

/// Read-only snapshot of the single playback session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackSession {
    pub track: Option<Track>,
    pub state: PlaybackState,
    pub position_seconds: f64,
    /// Unknown until the platform has loaded the source's metadata.
    pub duration_seconds: Option<f64>,
}

impl PlaybackSession {
    pub fn idle() -> Self {
        Self::default()
    }

    pub(crate) fn loading(track: Track) -> Self {
        Self {
            track: Some(track),
            state: PlaybackState::Loading,
            position_seconds: 0.0,
            duration_seconds: None,
        }
    }

    /// Fraction of the track played, in `[0, 1]`, when the duration is known.
    pub fn progress(&self) -> Option<f64> {
        match self.duration_seconds {
            Some(duration) if duration > 0.0 => {
                Some((self.position_seconds / duration).clamp(0.0, 1.0))
            }
            _ => None,
        }
    }

    pub fn track_id(&self) -> Option<String> {
        self.track.as_ref().map(|t| t.id.to_string())
    }

    pub(crate) fn position_ms(&self) -> u64 {
        (self.position_seconds.max(0.0) * 1000.0) as u64
    }
}
