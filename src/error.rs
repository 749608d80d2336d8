//! Error types for the FlagOps data store provider.

use thiserror::Error;

/// Errors that can occur when talking to the FlagOps data store.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid provider configuration (for example a malformed base URL).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// HTTP request failed before a response could be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest_middleware::Error),

    /// The data store answered a read with a non-success status.
    #[error("failed to fetch from data store: {0}")]
    Fetch(String),

    /// Response body was not the expected JSON shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The data store rejected a write. Carries the HTTP status text.
    #[error("failed to write to data store: {0}")]
    Write(String),
}

/// Result type alias for the provider.
pub type Result<T> = std::result::Result<T, Error>;
