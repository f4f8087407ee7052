use thiserror::Error;

/// Failures while assembling the runtime.
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value is present but unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A required bridge implementation was not injected.
    #[error("Capability missing: {capability} ({message})")]
    CapabilityMissing { capability: String, message: String },

    /// The tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
