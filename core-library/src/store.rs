//! # Library Store
//!
//! Owns the in-memory list of known local tracks.
//!
//! ## Overview
//!
//! - Ingestion hashes the full payload and rejects content that is already
//!   known, whatever the file is called.
//! - Sandboxed handles are converted to embedded bytes so the track can be
//!   played again after a restart.
//! - `persist` / `restore` move the whole list through the settings store as
//!   one versioned record.
//!
//! All state lives behind one async mutex, held for the full duration of each
//! operation including the storage write.

use crate::error::{LibraryError, Result};
use crate::hasher::ContentHasher;
use crate::models::{
    is_supported_extension, IngestCandidate, ScanReport, Track, TrackId, TrackMetadata,
};
use crate::snapshot::{self, LibrarySnapshot};
use crate::tags::read_tags;
use bridge_traits::{ByteSourceResolver, DirectoryEntry, DirectoryLister, Locator, SettingsStore};
use bytes::Bytes;
use chrono::Utc;
use core_runtime::config::DEFAULT_LIBRARY_KEY;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use core_runtime::logging::strip_path;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// Whether a mutation is written to storage before it is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Commit {
    Memory,
    Durable,
}

pub struct LibraryStore {
    settings: Arc<dyn SettingsStore>,
    resolver: Arc<dyn ByteSourceResolver>,
    event_bus: Option<EventBus>,
    key: String,
    hasher: ContentHasher,
    tracks: Mutex<Vec<Track>>,
}

impl LibraryStore {
    pub fn new(settings: Arc<dyn SettingsStore>, resolver: Arc<dyn ByteSourceResolver>) -> Self {
        Self {
            settings,
            resolver,
            event_bus: None,
            key: DEFAULT_LIBRARY_KEY.to_string(),
            hasher: ContentHasher::new(),
            tracks: Mutex::new(Vec::new()),
        }
    }

    /// Persist under `key` instead of the default `library`.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Resolve the candidate's bytes and ingest them.
    ///
    /// The track is only added in memory; see [`Self::ingest_and_persist`].
    ///
    /// # Errors
    ///
    /// - `Duplicate` when the content is already in the library
    /// - `NotFound` / `PermissionDenied` when the source cannot be read
    pub async fn ingest(&self, candidate: IngestCandidate) -> Result<Track> {
        let bytes = self.resolver.resolve(&candidate.locator).await?;
        self.ingest_with(candidate, bytes, Commit::Memory).await
    }

    /// Ingest a payload the caller already holds.
    pub async fn ingest_bytes(&self, candidate: IngestCandidate, bytes: Bytes) -> Result<Track> {
        self.ingest_with(candidate, bytes, Commit::Memory).await
    }

    /// Like [`Self::ingest`], writing the grown library before adding the
    /// track in memory. A failed write returns `Storage` and leaves the
    /// library unchanged.
    pub async fn ingest_and_persist(&self, candidate: IngestCandidate) -> Result<Track> {
        let bytes = self.resolver.resolve(&candidate.locator).await?;
        self.ingest_with(candidate, bytes, Commit::Durable).await
    }

    /// Like [`Self::ingest_bytes`], write first then commit.
    pub async fn ingest_bytes_and_persist(
        &self,
        candidate: IngestCandidate,
        bytes: Bytes,
    ) -> Result<Track> {
        self.ingest_with(candidate, bytes, Commit::Durable).await
    }

    #[instrument(
        skip(self, candidate, bytes),
        fields(name = %candidate.locator.base_name(), size = bytes.len())
    )]
    async fn ingest_with(
        &self,
        candidate: IngestCandidate,
        bytes: Bytes,
        commit: Commit,
    ) -> Result<Track> {
        let mut tracks = self.tracks.lock().await;
        let track = self.stage(&tracks, candidate, bytes)?;

        let mut next = tracks.clone();
        next.push(track.clone());
        self.commit(&mut tracks, next, commit).await?;

        self.announce(&track);
        Ok(track)
    }

    /// Remove a track in memory. Playlists referencing it are left untouched.
    pub async fn remove(&self, track_id: &TrackId) -> bool {
        // In-memory commits cannot fail
        self.remove_with(track_id, Commit::Memory)
            .await
            .unwrap_or(false)
    }

    /// Remove a track, writing the shrunk library before committing it.
    pub async fn remove_and_persist(&self, track_id: &TrackId) -> Result<bool> {
        self.remove_with(track_id, Commit::Durable).await
    }

    async fn remove_with(&self, track_id: &TrackId, commit: Commit) -> Result<bool> {
        let mut tracks = self.tracks.lock().await;
        if !tracks.iter().any(|t| &t.id == track_id) {
            return Ok(false);
        }

        let next: Vec<Track> = tracks
            .iter()
            .filter(|t| &t.id != track_id)
            .cloned()
            .collect();
        self.commit(&mut tracks, next, commit).await?;

        info!(track_id = %track_id, "Track removed");
        self.emit(LibraryEvent::TrackRemoved {
            track_id: track_id.to_string(),
        });
        Ok(true)
    }

    /// All tracks in insertion order.
    pub async fn list(&self) -> Vec<Track> {
        self.tracks.lock().await.clone()
    }

    pub async fn get(&self, track_id: &TrackId) -> Option<Track> {
        self.tracks
            .lock()
            .await
            .iter()
            .find(|t| &t.id == track_id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.tracks.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tracks.lock().await.is_empty()
    }

    /// Replace a track's metadata; the only mutation allowed on a stored track.
    pub async fn enrich_metadata(
        &self,
        track_id: &TrackId,
        metadata: TrackMetadata,
    ) -> Result<Track> {
        let mut tracks = self.tracks.lock().await;
        let track = tracks
            .iter_mut()
            .find(|t| &t.id == track_id)
            .ok_or_else(|| LibraryError::NotFound {
                entity_type: "track".to_string(),
                id: track_id.to_string(),
            })?;

        track.metadata = metadata;
        let updated = track.clone();
        debug!(track_id = %track_id, "Track metadata enriched");

        self.emit(LibraryEvent::TrackUpdated {
            track_id: track_id.to_string(),
        });
        Ok(updated)
    }

    /// Write the full track list to the settings store.
    pub async fn persist(&self) -> Result<()> {
        let tracks = self.tracks.lock().await;
        self.write(&tracks).await
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// Never fails: absent or unusable state yields an empty library.
    /// Returns the number of restored tracks.
    pub async fn restore(&self) -> usize {
        let mut tracks = self.tracks.lock().await;
        let restored = snapshot::load::<LibrarySnapshot>(self.settings.as_ref(), &self.key)
            .await
            .map(|record| record.tracks)
            .unwrap_or_default();

        // Keep the first track per content hash if the record was edited by hand
        let mut seen = HashSet::new();
        let before = restored.len();
        let deduped: Vec<Track> = restored
            .into_iter()
            .filter(|t| seen.insert(t.content_hash.clone()))
            .collect();
        if deduped.len() != before {
            warn!(
                dropped = before - deduped.len(),
                "Persisted library held duplicate content"
            );
        }

        *tracks = deduped;
        info!(count = tracks.len(), "Library restored");
        tracks.len()
    }

    /// List each scope and ingest the supported audio files found.
    ///
    /// A failing scope or unreadable file is logged and skipped; the scan
    /// carries on with the rest. Tracks are only added in memory.
    pub async fn scan(&self, lister: &dyn DirectoryLister, scopes: &[PathBuf]) -> ScanReport {
        // In-memory commits cannot fail
        self.scan_with(lister, scopes, Commit::Memory)
            .await
            .unwrap_or_default()
    }

    /// Like [`Self::scan`], writing the library before committing the new
    /// tracks. Nothing is written when the scan added nothing; a failed
    /// write returns `Storage` and drops the whole batch.
    pub async fn scan_and_persist(
        &self,
        lister: &dyn DirectoryLister,
        scopes: &[PathBuf],
    ) -> Result<ScanReport> {
        self.scan_with(lister, scopes, Commit::Durable).await
    }

    async fn scan_with(
        &self,
        lister: &dyn DirectoryLister,
        scopes: &[PathBuf],
        commit: Commit,
    ) -> Result<ScanReport> {
        let mut tracks = self.tracks.lock().await;
        let mut next = tracks.clone();
        let mut added = Vec::new();
        let mut report = ScanReport::default();

        for scope in scopes {
            let entries = match lister.list(scope).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(scope = %scope.display(), error = %e, "Could not list scope");
                    continue;
                }
            };
            debug!(
                scope = %strip_path(&scope.to_string_lossy()),
                count = entries.len(),
                "Scanning scope"
            );

            for entry in &entries {
                if !is_audio_candidate(entry) {
                    debug!(file = %entry.name, "Not an audio file, skipping");
                    report.skipped += 1;
                    continue;
                }

                let candidate = IngestCandidate::from(entry);
                let staged = match self.resolver.resolve(&candidate.locator).await {
                    Ok(bytes) => self.stage(&next, candidate, bytes),
                    Err(e) => Err(e.into()),
                };

                match staged {
                    Ok(track) => {
                        next.push(track.clone());
                        added.push(track);
                        report.added += 1;
                    }
                    Err(LibraryError::Duplicate { .. }) => report.duplicates += 1,
                    Err(e) => {
                        warn!(path = %entry.path.display(), error = %e, "Failed to ingest file");
                        report.skipped += 1;
                    }
                }
            }
        }

        if !added.is_empty() {
            self.commit(&mut tracks, next, commit).await?;
        }
        for track in &added {
            self.announce(track);
        }

        info!(
            added = report.added,
            duplicates = report.duplicates,
            skipped = report.skipped,
            "Library scan completed"
        );
        self.emit(LibraryEvent::ScanCompleted {
            added: report.added,
            duplicates: report.duplicates,
            skipped: report.skipped,
        });
        Ok(report)
    }

    /// Build the track for `bytes`, rejecting content already in `tracks`.
    fn stage(&self, tracks: &[Track], candidate: IngestCandidate, bytes: Bytes) -> Result<Track> {
        let display_name = candidate.display_name();
        let base_name = candidate.locator.base_name();
        if tracks
            .iter()
            .any(|t| t.size_bytes == candidate.size_bytes && t.locator.base_name() == base_name)
        {
            debug!("Name and size match an existing track, checking content");
        }

        let content_hash = self.hasher.hash(&bytes);
        if let Some(existing) = tracks.iter().find(|t| t.content_hash == content_hash) {
            info!(existing = %existing.id, "Skipping duplicate content");
            return Err(LibraryError::Duplicate {
                existing_id: existing.id.to_string(),
            });
        }

        let metadata = read_tags(&bytes).into_metadata(&display_name);
        let locator = match candidate.locator {
            Locator::Handle { name, .. } => Locator::embedded(name, bytes),
            other => other,
        };

        Ok(Track {
            id: TrackId::from(&content_hash),
            display_name,
            locator,
            size_bytes: candidate.size_bytes,
            last_modified: candidate.last_modified,
            content_hash,
            metadata,
            added_at: Utc::now().timestamp(),
        })
    }

    /// Swap in `next`, writing it first when the commit is durable.
    async fn commit(
        &self,
        tracks: &mut MutexGuard<'_, Vec<Track>>,
        next: Vec<Track>,
        commit: Commit,
    ) -> Result<()> {
        if commit == Commit::Durable {
            self.write(&next).await?;
        }
        **tracks = next;
        Ok(())
    }

    async fn write(&self, tracks: &[Track]) -> Result<()> {
        let record = LibrarySnapshot::new(tracks.to_vec());
        snapshot::save(self.settings.as_ref(), &self.key, &record).await?;
        debug!(count = tracks.len(), "Library persisted");
        Ok(())
    }

    fn announce(&self, track: &Track) {
        info!(track_id = %track.id, title = %track.title(), "Track ingested");
        self.emit(LibraryEvent::TrackAdded {
            track_id: track.id.to_string(),
            title: track.title().to_string(),
            artist: track.artist_label().to_string(),
        });
    }

    fn emit(&self, event: LibraryEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Library(event)).ok();
        }
    }
}

/// A regular file with a non-blank name and a supported extension.
fn is_audio_candidate(entry: &DirectoryEntry) -> bool {
    if entry.is_directory || entry.name.trim().is_empty() {
        return false;
    }

    Path::new(&entry.name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(is_supported_extension)
        .unwrap_or(false)
}
