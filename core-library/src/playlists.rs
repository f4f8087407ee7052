//! # Playlist Manager
//!
//! Owns the user's named playlists. Playlists hold track references, not
//! tracks, so removing a track from the library leaves a stale entry that
//! [`PlaylistManager::resolve`] reports as [`PlaylistEntry::Missing`].
//!
//! Every mutation builds the next list, writes it, and only then swaps it in.
//! A failed write returns [`LibraryError::Storage`] with memory untouched.

use crate::error::{LibraryError, Result};
use crate::models::{Playlist, PlaylistEntry, Track, TrackRef};
use crate::snapshot::{self, PlaylistSnapshot};
use crate::store::LibraryStore;
use bridge_traits::SettingsStore;
use core_runtime::config::DEFAULT_PLAYLISTS_KEY;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

pub struct PlaylistManager {
    settings: Arc<dyn SettingsStore>,
    event_bus: Option<EventBus>,
    key: String,
    playlists: Mutex<Vec<Playlist>>,
}

impl PlaylistManager {
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            settings,
            event_bus: None,
            key: DEFAULT_PLAYLISTS_KEY.to_string(),
            playlists: Mutex::new(Vec::new()),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Create an empty playlist. Names need not be unique but must not be blank.
    pub async fn create(&self, name: &str) -> Result<Playlist> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::InvalidInput {
                field: "name".to_string(),
                message: "Playlist name cannot be empty".to_string(),
            });
        }

        let mut playlists = self.playlists.lock().await;
        let playlist = Playlist::new(name);

        let mut next = playlists.clone();
        next.push(playlist.clone());
        self.commit(&mut playlists, next).await?;

        info!(playlist_id = %playlist.id, name = %playlist.name, "Playlist created");
        self.emit(LibraryEvent::PlaylistCreated {
            playlist_id: playlist.id.to_string(),
            name: playlist.name.clone(),
        });
        Ok(playlist)
    }

    /// Append a track reference.
    pub async fn add_track(&self, playlist_index: usize, track: &Track) -> Result<Playlist> {
        let mut playlists = self.playlists.lock().await;
        check_index("playlist", playlist_index, playlists.len())?;
        let position = playlists[playlist_index].tracks.len();

        self.insert_locked(&mut playlists, playlist_index, position, track)
            .await
    }

    /// Insert a track reference at `position`; `position == len` appends.
    pub async fn insert_track(
        &self,
        playlist_index: usize,
        position: usize,
        track: &Track,
    ) -> Result<Playlist> {
        let mut playlists = self.playlists.lock().await;
        check_index("playlist", playlist_index, playlists.len())?;

        let count = playlists[playlist_index].tracks.len();
        if position > count {
            return Err(LibraryError::IndexOutOfRange {
                entity: "playlist tracks",
                index: position,
                len: count,
            });
        }

        self.insert_locked(&mut playlists, playlist_index, position, track)
            .await
    }

    /// Remove the entry at `track_index` and return it.
    pub async fn remove_track(
        &self,
        playlist_index: usize,
        track_index: usize,
    ) -> Result<TrackRef> {
        let mut playlists = self.playlists.lock().await;
        check_index("playlist", playlist_index, playlists.len())?;
        check_index(
            "playlist tracks",
            track_index,
            playlists[playlist_index].tracks.len(),
        )?;

        let mut next = playlists.clone();
        let removed = next[playlist_index].tracks.remove(track_index);
        let updated = next[playlist_index].clone();
        self.commit(&mut playlists, next).await?;

        debug!(
            playlist_id = %updated.id,
            track_id = %removed.track_id,
            "Track removed from playlist"
        );
        self.emit_updated(&updated, "track_removed");
        Ok(removed)
    }

    /// Delete a playlist and return it.
    pub async fn delete(&self, playlist_index: usize) -> Result<Playlist> {
        let mut playlists = self.playlists.lock().await;
        check_index("playlist", playlist_index, playlists.len())?;

        let mut next = playlists.clone();
        let removed = next.remove(playlist_index);
        self.commit(&mut playlists, next).await?;

        info!(playlist_id = %removed.id, name = %removed.name, "Playlist deleted");
        self.emit(LibraryEvent::PlaylistDeleted {
            playlist_id: removed.id.to_string(),
            name: removed.name.clone(),
        });
        Ok(removed)
    }

    pub async fn list(&self) -> Vec<Playlist> {
        self.playlists.lock().await.clone()
    }

    pub async fn get(&self, playlist_index: usize) -> Option<Playlist> {
        self.playlists.lock().await.get(playlist_index).cloned()
    }

    pub async fn len(&self) -> usize {
        self.playlists.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.playlists.lock().await.is_empty()
    }

    /// Resolve a playlist's references against the library, in order.
    pub async fn resolve(
        &self,
        playlist_index: usize,
        library: &LibraryStore,
    ) -> Result<Vec<PlaylistEntry>> {
        let playlist = {
            let playlists = self.playlists.lock().await;
            check_index("playlist", playlist_index, playlists.len())?;
            playlists[playlist_index].clone()
        };

        let mut entries = Vec::with_capacity(playlist.tracks.len());
        for reference in playlist.tracks {
            let entry = match library.get(&reference.track_id).await {
                Some(track) => PlaylistEntry::Available(track),
                None => PlaylistEntry::Missing(reference),
            };
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Write all playlists to the settings store.
    pub async fn persist(&self) -> Result<()> {
        let playlists = self.playlists.lock().await;
        let record = PlaylistSnapshot::new(playlists.clone());
        snapshot::save(self.settings.as_ref(), &self.key, &record).await
    }

    /// Replace the in-memory playlists with the persisted ones.
    ///
    /// Never fails; returns the number of restored playlists.
    pub async fn restore(&self) -> usize {
        let mut playlists = self.playlists.lock().await;
        *playlists = snapshot::load::<PlaylistSnapshot>(self.settings.as_ref(), &self.key)
            .await
            .map(|record| record.playlists)
            .unwrap_or_default();

        info!(count = playlists.len(), "Playlists restored");
        playlists.len()
    }

    async fn insert_locked(
        &self,
        playlists: &mut MutexGuard<'_, Vec<Playlist>>,
        playlist_index: usize,
        position: usize,
        track: &Track,
    ) -> Result<Playlist> {
        let mut next = (**playlists).clone();
        next[playlist_index].tracks.insert(position, track.to_ref());
        let updated = next[playlist_index].clone();
        self.commit(playlists, next).await?;

        debug!(
            playlist_id = %updated.id,
            track_id = %track.id,
            position,
            "Track added to playlist"
        );
        self.emit_updated(&updated, "track_added");
        Ok(updated)
    }

    /// Persist `next`, then make it current.
    async fn commit(
        &self,
        playlists: &mut MutexGuard<'_, Vec<Playlist>>,
        next: Vec<Playlist>,
    ) -> Result<()> {
        let record = PlaylistSnapshot::new(next);
        snapshot::save(self.settings.as_ref(), &self.key, &record).await?;
        **playlists = record.playlists;
        Ok(())
    }

    fn emit_updated(&self, playlist: &Playlist, change_type: &str) {
        self.emit(LibraryEvent::PlaylistUpdated {
            playlist_id: playlist.id.to_string(),
            change_type: change_type.to_string(),
            track_count: playlist.tracks.len() as u32,
        });
    }

    fn emit(&self, event: LibraryEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Library(event)).ok();
        }
    }
}

fn check_index(entity: &'static str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(LibraryError::IndexOutOfRange { entity, index, len })
    }
}
