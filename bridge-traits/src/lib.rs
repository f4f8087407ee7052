//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the player core and the
//! platform-specific collaborators it consumes. The core never touches a file
//! handle, an audio element or a preferences API directly; it goes through the
//! traits below and the host injects concrete adapters.
//!
//! ## Traits
//!
//! ### Storage & I/O
//! - [`SettingsStore`](storage::SettingsStore) - Durable key-value store (last write wins)
//! - [`ByteSourceResolver`](storage::ByteSourceResolver) - Resolve a [`Locator`] into bytes
//! - [`DirectoryLister`](storage::DirectoryLister) - Enumerate audio candidates in a scope
//!
//! ### Platform Integration
//! - [`PermissionPrompt`](permission::PermissionPrompt) - Storage access check/request
//! - [`PlaybackAdapter`](playback::PlaybackAdapter) - The platform's audio element
//! - [`SearchProvider`](search::SearchProvider) - Streaming catalog lookup
//! - [`HttpClient`](http::HttpClient) - Async HTTP used by catalog providers
//!
//! ### Utilities
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Android  | TBD                 | 📋 Planned |
//! | iOS      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should map platform failures onto `NotFound` / `PermissionDenied` where
//! they apply so the core can tell a missing file from a refused one.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so adapters can be shared across
//! async tasks behind an `Arc`.

pub mod error;
pub mod http;
pub mod log;
pub mod permission;
pub mod playback;
pub mod search;
pub mod source;
pub mod storage;

pub use error::BridgeError;

pub use http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
pub use log::{LogEntry, LogLevel, LoggerSink};
pub use permission::{PermissionPrompt, PermissionStatus};
pub use playback::{
    AdapterState, AudioSource, PlaybackAdapter, PlaybackMetadata, PlaybackRequest,
    PlaybackSessionId,
};
pub use search::{CatalogTrack, SearchProvider};
pub use source::Locator;
pub use storage::{ByteSourceResolver, DirectoryEntry, DirectoryLister, SettingsStore};
