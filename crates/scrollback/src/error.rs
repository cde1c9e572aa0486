use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid message dump: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to serialize preferences: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Message {0} is not in the dump")]
    UnknownMessage(String),

    #[error(transparent)]
    Core(#[from] scrollback_core::error::Error),
}
