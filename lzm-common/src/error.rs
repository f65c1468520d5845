//! Common error types for the LizardMatch client

use thiserror::Error;

use crate::client::ApiError;

/// Common result type for LizardMatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the survey and dex components
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be encoded or decoded
    #[error("Storage error: {0}")]
    Storage(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend request failed
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Text suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            Error::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
