//! Domain models for the local library and playlists
//!
//! Every record here is a closed, explicitly shaped value. Components hand out
//! clones of these; nothing outside the owning store mutates them.

use bridge_traits::{DirectoryEntry, Locator};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Label shown when a track carries no artist tag.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Bundled artwork shown when a track has no cover.
pub const PLACEHOLDER_COVER: &str = "assets/default-album.png";

/// File extensions accepted by directory scans (lowercase, without the dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "m4a", "aac", "wav", "ogg", "flac", "opus"];

/// Whether `extension` (any case) is a supported audio type.
pub fn is_supported_extension(extension: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(extension))
}

/// Human-readable name for a file: extension stripped, `_` and `-` turned
/// into spaces.
///
/// ```
/// use core_library::models::display_name_from;
///
/// assert_eq!(display_name_from("My_Song-Live.mp3"), "My Song Live");
/// ```
pub fn display_name_from(base_name: &str) -> String {
    let stem = match base_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() && !ext.contains('/') => stem,
        _ => base_name,
    };
    stem.replace(['_', '-'], " ")
}

// =============================================================================
// ID Types
// =============================================================================

/// Lowercase hex SHA-256 of a track's full byte content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a track, derived from its content hash so that
/// re-ingesting identical bytes yields the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&ContentHash> for TrackId {
    fn from(hash: &ContentHash) -> Self {
        Self(hash.as_str().to_string())
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(pub Uuid);

impl PlaylistId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for PlaylistId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Track metadata
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ArtistCredit {
    #[default]
    Unknown,
    Named(String),
}

impl ArtistCredit {
    /// Builds a credit from an optional tag value; blank values are unknown.
    pub fn from_tag(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(name) if !name.is_empty() => Self::Named(name.to_string()),
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Unknown => UNKNOWN_ARTIST,
            Self::Named(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "uri", rename_all = "snake_case")]
pub enum CoverArt {
    #[default]
    Placeholder,
    /// URL or asset path of real artwork
    Reference(String),
}

impl CoverArt {
    pub fn uri(&self) -> &str {
        match self {
            Self::Placeholder => PLACEHOLDER_COVER,
            Self::Reference(uri) => uri,
        }
    }
}

/// Where a track's title and artist came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    /// Derived from the file name
    FileName,
    /// Read from embedded tags
    Tags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: ArtistCredit,
    pub cover: CoverArt,
    pub source: MetadataSource,
}

impl TrackMetadata {
    /// Metadata derived only from the display name.
    pub fn from_file_name(display_name: &str) -> Self {
        Self {
            title: display_name.to_string(),
            artist: ArtistCredit::Unknown,
            cover: CoverArt::Placeholder,
            source: MetadataSource::FileName,
        }
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// A local audio file known to the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub display_name: String,
    pub locator: Locator,
    pub size_bytes: u64,
    /// Source modification time, Unix milliseconds
    pub last_modified: Option<i64>,
    pub content_hash: ContentHash,
    pub metadata: TrackMetadata,
    /// Ingestion time, Unix seconds
    pub added_at: i64,
}

impl Track {
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn artist_label(&self) -> &str {
        self.metadata.artist.label()
    }

    pub fn cover_uri(&self) -> &str {
        self.metadata.cover.uri()
    }

    pub fn to_ref(&self) -> TrackRef {
        TrackRef {
            track_id: self.id.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Reference to a track held by a playlist.
///
/// The display name is cached so an entry whose track was removed can still
/// be labelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRef {
    pub track_id: TrackId,
    pub display_name: String,
}

/// User-created, ordered list of track references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub tracks: Vec<TrackRef>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlaylistId::new(),
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    pub fn contains(&self, track_id: &TrackId) -> bool {
        self.tracks.iter().any(|t| &t.track_id == track_id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// A playlist entry resolved against the current library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistEntry {
    Available(Track),
    /// The referenced track is no longer in the library.
    Missing(TrackRef),
}

impl PlaylistEntry {
    pub fn display_name(&self) -> &str {
        match self {
            Self::Available(track) => &track.display_name,
            Self::Missing(reference) => &reference.display_name,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }
}

/// A file offered for ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestCandidate {
    pub locator: Locator,
    pub size_bytes: u64,
    pub last_modified: Option<i64>,
}

impl IngestCandidate {
    pub fn new(locator: Locator, size_bytes: u64) -> Self {
        Self {
            locator,
            size_bytes,
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, millis: i64) -> Self {
        self.last_modified = Some(millis);
        self
    }

    pub fn display_name(&self) -> String {
        display_name_from(&self.locator.base_name())
    }
}

impl From<&DirectoryEntry> for IngestCandidate {
    fn from(entry: &DirectoryEntry) -> Self {
        Self {
            locator: Locator::file(entry.path.clone()),
            size_bytes: entry.size,
            last_modified: entry.last_modified,
        }
    }
}

/// Outcome counts of a directory scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub added: u32,
    pub duplicates: u32,
    pub skipped: u32,
}

impl ScanReport {
    pub fn total(&self) -> u32 {
        self.added + self.duplicates + self.skipped
    }
}
