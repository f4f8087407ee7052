//! # Deezer Provider
//!
//! Implements `SearchProvider` over the public Deezer search API.
//!
//! ## Overview
//!
//! This module provides:
//! - Free-text track search (`GET /search?q=...`), no authentication required
//! - Mapping of Deezer track objects onto [`CatalogTrack`](bridge_traits::CatalogTrack)
//! - 30-second preview URLs, played by the core as transient remote tracks
//!
//! All requests go through the host's [`HttpClient`](bridge_traits::HttpClient).

pub mod client;
pub mod error;
pub mod types;

pub use client::{DeezerSearchProvider, DEEZER_API_BASE};
pub use error::{DeezerError, Result};
