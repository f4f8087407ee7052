//! # Library Management Module
//!
//! Owns the local track library and the user's playlists.
//!
//! ## Overview
//!
//! This module manages:
//! - Content fingerprinting ([`hasher`]) used as track identity
//! - The [`LibraryStore`](store::LibraryStore): ingestion, deduplication, directory scans
//! - The [`PlaylistManager`](playlists::PlaylistManager): ordered track references,
//!   persisted on every mutation
//! - Versioned persistence envelopes ([`snapshot`]) over the host's settings store
//!
//! ## Example
//!
//! ```ignore
//! use core_library::{IngestCandidate, LibraryStore, PlaylistManager};
//!
//! let library = LibraryStore::new(settings.clone(), resolver);
//! library.restore().await;
//!
//! let track = library.ingest(candidate).await?;
//! library.persist().await?;
//!
//! let playlists = PlaylistManager::new(settings);
//! playlists.create("Gym").await?;
//! playlists.add_track(0, &track).await?;
//! ```

pub mod error;
pub mod hasher;
pub mod models;
pub mod playlists;
pub mod snapshot;
pub mod store;
pub mod tags;

pub use error::{LibraryError, Result};
pub use hasher::{ContentHasher, IncrementalHash};
pub use models::{
    ArtistCredit, ContentHash, CoverArt, IngestCandidate, MetadataSource, Playlist, PlaylistEntry,
    PlaylistId, ScanReport, Track, TrackId, TrackMetadata, TrackRef,
};
pub use playlists::PlaylistManager;
pub use store::LibraryStore;
