//! Error types for licdash.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Source errors
    #[error("Failed to fetch licenses: {0}")]
    Fetch(String),

    #[error("Failed to update license: {0}")]
    Update(String),

    #[error("License not found: {0}")]
    LicenseNotFound(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    // Input errors
    #[error("{0}")]
    Validation(String),

    // Session errors
    #[error("Authentication required: run `licdash login` first")]
    AuthenticationRequired,

    // Infrastructure errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
