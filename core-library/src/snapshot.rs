//! Versioned persistence envelopes
//!
//! The library and the playlists are stored as two independent JSON records,
//! each shaped `{ "version": 1, ... }`. Loading is forgiving: a missing,
//! unreadable, malformed or newer-versioned record reads as "no prior state".

use crate::error::{LibraryError, Result};
use crate::models::{Playlist, Track};
use bridge_traits::SettingsStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Envelope version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted form of the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    pub version: u32,
    pub tracks: Vec<Track>,
}

impl LibrarySnapshot {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            tracks,
        }
    }
}

/// Persisted form of all playlists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSnapshot {
    pub version: u32,
    pub playlists: Vec<Playlist>,
}

impl PlaylistSnapshot {
    pub fn new(playlists: Vec<Playlist>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            playlists,
        }
    }
}

/// Serialize `snapshot` and write it under `key`.
pub(crate) async fn save<T: Serialize>(
    store: &dyn SettingsStore,
    key: &str,
    snapshot: &T,
) -> Result<()> {
    let json = serde_json::to_string(snapshot)
        .map_err(|e| LibraryError::Storage(format!("failed to encode {key}: {e}")))?;

    store
        .set_string(key, &json)
        .await
        .map_err(|e| LibraryError::Storage(format!("failed to write {key}: {e}")))
}

/// Read the record under `key`, or `None` when there is no usable prior state.
pub(crate) async fn load<T: DeserializeOwned>(store: &dyn SettingsStore, key: &str) -> Option<T> {
    let raw = match store.get_string(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "No persisted record");
            return None;
        }
        Err(e) => {
            warn!(key, error = %e, "Persisted record unreadable, starting empty");
            return None;
        }
    };

    decode(key, &raw)
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "Persisted record is not valid JSON, starting empty");
            return None;
        }
    };

    match value.get("version").and_then(serde_json::Value::as_u64) {
        Some(version) if version > u64::from(SNAPSHOT_VERSION) => {
            warn!(
                key,
                version,
                supported = SNAPSHOT_VERSION,
                "Persisted record written by a newer version, starting empty"
            );
            return None;
        }
        Some(_) => {}
        None => {
            warn!(key, "Persisted record has no version, starting empty");
            return None;
        }
    }

    match serde_json::from_value(value) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(key, error = %e, "Persisted record is malformed, starting empty");
            None
        }
    }
}
