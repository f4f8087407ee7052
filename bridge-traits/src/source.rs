//! Byte source references.
//!
//! A [`Locator`] is an opaque pointer to audio bytes. Only the platform's
//! [`ByteSourceResolver`](crate::storage::ByteSourceResolver) knows how to
//! turn it into a buffer; the core only inspects it for a display name and to
//! decide whether it can be stored as-is.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Reference to an underlying byte source.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// File on a filesystem the host can reopen later.
    File { path: PathBuf },
    /// HTTP(S) resource, e.g. a catalog preview.
    Remote { url: String },
    /// Bytes carried inline. Serialized as base64.
    Embedded {
        name: String,
        #[serde(with = "base64_bytes")]
        data: Bytes,
    },
    /// Sandboxed handle (document picker, SAF grant) that may not be valid
    /// after the process restarts.
    Handle { name: String, handle: String },
}

impl Locator {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote { url: url.into() }
    }

    pub fn embedded(name: impl Into<String>, data: Bytes) -> Self {
        Self::Embedded {
            name: name.into(),
            data,
        }
    }

    pub fn handle(name: impl Into<String>, handle: impl Into<String>) -> Self {
        Self::Handle {
            name: name.into(),
            handle: handle.into(),
        }
    }

    /// Last path component of the source, including its extension.
    pub fn base_name(&self) -> String {
        match self {
            Locator::File { path } => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Locator::Remote { url } => {
                let without_query = url
                    .split(['?', '#'])
                    .next()
                    .unwrap_or(url.as_str())
                    .trim_end_matches('/');
                without_query
                    .rsplit('/')
                    .next()
                    .unwrap_or(without_query)
                    .to_string()
            }
            Locator::Embedded { name, .. } | Locator::Handle { name, .. } => {
                Path::new(name)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| name.clone())
            }
        }
    }

    /// Lowercased extension of [`base_name`](Self::base_name), if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.base_name();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Whether the locator can be resolved again after a restart without
    /// carrying its bytes along.
    pub fn is_re_resolvable(&self) -> bool {
        !matches!(self, Locator::Handle { .. })
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Locator::Remote { .. })
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::File { path } => f.debug_struct("File").field("path", path).finish(),
            Locator::Remote { url } => f.debug_struct("Remote").field("url", url).finish(),
            Locator::Embedded { name, data } => f
                .debug_struct("Embedded")
                .field("name", name)
                .field("len", &data.len())
                .finish(),
            Locator::Handle { name, handle } => f
                .debug_struct("Handle")
                .field("name", name)
                .field("handle", handle)
                .finish(),
        }
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &Bytes, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_per_variant() {
        assert_eq!(
            Locator::file("/storage/emulated/0/My_Song.mp3").base_name(),
            "My_Song.mp3"
        );
        assert_eq!(
            Locator::remote("https://cdn.example.com/stream/c-abc.mp3?hdnea=exp").base_name(),
            "c-abc.mp3"
        );
        assert_eq!(
            Locator::embedded("picked.flac", Bytes::from_static(b"x")).base_name(),
            "picked.flac"
        );
        assert_eq!(
            Locator::handle("content/doc.ogg", "content://media/42").base_name(),
            "doc.ogg"
        );
    }

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(Locator::file("a/B.MP3").extension().as_deref(), Some("mp3"));
        assert_eq!(Locator::file("a/noext").extension(), None);
        assert_eq!(Locator::file("a/.hidden").extension(), None);
    }

    #[test]
    fn test_embedded_bytes_are_base64_in_json() {
        let locator = Locator::embedded("a.mp3", Bytes::from_static(b"hello"));
        let json = serde_json::to_value(&locator).unwrap();
        assert_eq!(json["kind"], "embedded");
        assert_eq!(json["data"], "aGVsbG8=");

        let back: Locator = serde_json::from_value(json).unwrap();
        assert_eq!(back, locator);
    }

    #[test]
    fn test_only_handles_need_embedding() {
        assert!(Locator::file("a.mp3").is_re_resolvable());
        assert!(Locator::remote("https://x/a.mp3").is_re_resolvable());
        assert!(!Locator::handle("a.mp3", "content://1").is_re_resolvable());
    }
}
