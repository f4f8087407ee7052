//! # Playback Module
//!
//! Drives the platform's audio element for exactly one track at a time.
//!
//! ## Overview
//!
//! This module handles:
//! - The [`PlaybackController`] state machine (start, pause/resume, seek, stop)
//! - Source selection with a single fallback to the direct file path
//! - Pull-based progress through [`PlaybackController::tick`]
//!
//! Decoding and output are the host's job, behind
//! [`bridge_traits::PlaybackAdapter`].

pub mod controller;
pub mod error;
pub mod session;

pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use session::{PlaybackSession, PlaybackState};
