//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux). Hosts use these directly, and the core falls back
//! to them when the `desktop-shims` feature is enabled.
//!
//! - `SettingsStore` using a SQLite-backed key-value table
//! - `ByteSourceResolver` / `DirectoryLister` using `tokio::fs`
//! - `HttpClient` using `reqwest`
//! - `PermissionPrompt` that always grants access
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{SqliteSettingsStore, TokioFileSystem};
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = SqliteSettingsStore::default_location().await.unwrap();
//!     let fs = TokioFileSystem::new();
//!
//!     // Use in core configuration
//! }
//! ```

mod filesystem;
mod http;
mod permission;
mod settings;

pub use filesystem::TokioFileSystem;
pub use http::ReqwestHttpClient;
pub use permission::DesktopPermissionPrompt;
pub use settings::SqliteSettingsStore;
