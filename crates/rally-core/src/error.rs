//! Error types for rally-core

use thiserror::Error;

/// Result type alias using rally-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rally-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend rejected the request
    #[error("Backend API error: {0}")]
    Api(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Disallowed match status transition
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
