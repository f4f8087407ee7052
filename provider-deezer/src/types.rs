//! Deezer API response types
//!
//! Only the fields the player uses are modelled; everything else in the
//! payload is ignored.

use bridge_traits::CatalogTrack;
use serde::Deserialize;

/// Response of `GET /search`
///
/// See: https://developers.deezer.com/api/search
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<DeezerTrack>,

    /// Total number of matches across all pages
    #[serde(default)]
    pub total: Option<u64>,

    /// URL of the next page
    #[serde(default)]
    pub next: Option<String>,

    /// Deezer reports failures (quota, bad parameters) as a 200 with this set
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: Option<u32>,
}

/// Deezer track object
#[derive(Debug, Clone, Deserialize)]
pub struct DeezerTrack {
    pub id: u64,
    pub title: String,
    /// 30-second MP3 preview; empty string when unavailable
    #[serde(default)]
    pub preview: Option<String>,
    pub artist: DeezerArtist,
    pub album: DeezerAlbum,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeezerArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeezerAlbum {
    pub title: String,
    #[serde(default)]
    pub cover_medium: Option<String>,
}

impl From<DeezerTrack> for CatalogTrack {
    fn from(track: DeezerTrack) -> Self {
        CatalogTrack {
            id: track.id.to_string(),
            title: track.title,
            artist: track.artist.name,
            album: track.album.title,
            cover: track.album.cover_medium.filter(|url| !url.is_empty()),
            preview_url: track.preview.filter(|url| !url.is_empty()),
        }
    }
}
