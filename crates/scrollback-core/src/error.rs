//! Error types for the scrollback-core crate

use thiserror::Error;

/// Result type alias for scrollback-core operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Display time zone could not be resolved
    #[error("Unknown time zone: {0}")]
    TimeZone(String),

    /// A message or group referenced by id is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller misuse or a broken internal invariant
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Failed to serialize preferences: {0}")]
    Serialization(#[from] toml::ser::Error),
}
