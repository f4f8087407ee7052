//! Workspace umbrella crate.
//!
//! Host applications can depend on `tunedeck-workspace` and pick features
//! (`desktop-shims`, `deezer`) instead of wiring each crate individually.

#[cfg(any(feature = "desktop-shims", feature = "deezer"))]
pub use core_service as service;

#[cfg(feature = "deezer")]
pub use provider_deezer as deezer;
