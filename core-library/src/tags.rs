//! Embedded tag reading
//!
//! Reads title and artist from ID3v2, Vorbis Comments, MP4 or APE tags with
//! `lofty`. Unreadable or untagged payloads are not errors; the caller falls
//! back to file-name metadata.

use crate::models::{ArtistCredit, CoverArt, MetadataSource, TrackMetadata};
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::Accessor;
use tracing::debug;

/// Title and artist found in a file's tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedTags {
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl EmbeddedTags {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none()
    }

    /// Merge into track metadata, using `display_name` for a missing title.
    pub fn into_metadata(self, display_name: &str) -> TrackMetadata {
        if self.is_empty() {
            return TrackMetadata::from_file_name(display_name);
        }

        TrackMetadata {
            title: self.title.unwrap_or_else(|| display_name.to_string()),
            artist: ArtistCredit::from_tag(self.artist.as_deref()),
            cover: CoverArt::Placeholder,
            source: MetadataSource::Tags,
        }
    }
}

/// Read tags from an in-memory payload.
pub fn read_tags(data: &[u8]) -> EmbeddedTags {
    let probe = match Probe::new(std::io::Cursor::new(data)).guess_file_type() {
        Ok(probe) => probe,
        Err(e) => {
            debug!(error = %e, "Could not probe audio payload");
            return EmbeddedTags::default();
        }
    };

    let tagged_file = match probe.read() {
        Ok(file) => file,
        Err(e) => {
            debug!(error = %e, "No readable tags in audio payload");
            return EmbeddedTags::default();
        }
    };

    // Primary tag first, then whatever else the container carries
    let Some(tag) = tagged_file
        .primary_tag()
        .or_else(|| tagged_file.first_tag())
    else {
        return EmbeddedTags::default();
    };

    EmbeddedTags {
        title: tag.title().and_then(|s| non_blank(&s)),
        artist: tag.artist().and_then(|s| non_blank(&s)),
    }
}

/// Collapse whitespace and drop control characters; blank becomes `None`.
fn non_blank(text: &str) -> Option<String> {
    let normalized: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .filter(|c| !c.is_control())
        .collect();

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_payload_has_no_tags() {
        let tags = read_tags(b"definitely not an audio file");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_untagged_falls_back_to_file_name() {
        let metadata = EmbeddedTags::default().into_metadata("My Song");
        assert_eq!(metadata.title, "My Song");
        assert_eq!(metadata.artist, ArtistCredit::Unknown);
        assert_eq!(metadata.source, MetadataSource::FileName);
    }

    #[test]
    fn test_artist_only_keeps_display_title() {
        let tags = EmbeddedTags {
            title: None,
            artist: Some("Nina Simone".into()),
        };
        let metadata = tags.into_metadata("Feeling Good");
        assert_eq!(metadata.title, "Feeling Good");
        assert_eq!(metadata.artist.label(), "Nina Simone");
        assert_eq!(metadata.source, MetadataSource::Tags);
    }

    #[test]
    fn test_normalization() {
        assert_eq!(non_blank("  Hello \t  World\n"), Some("Hello World".into()));
        assert_eq!(non_blank("\u{0}\u{1}"), None);
        assert_eq!(non_blank("   "), None);
    }
}
