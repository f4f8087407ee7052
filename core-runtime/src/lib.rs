//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the player core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! Every other core crate depends on this one for its logging conventions,
//! its configuration type and the events it publishes.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
