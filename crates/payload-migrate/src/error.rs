//! Error types for payload-migrate.

use thiserror::Error;

/// Errors produced by the migration tool.
///
/// Only [`Error::Authentication`] aborts a run; every other failure is
/// handled at the call site and degrades to a logged message.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Login against a backend failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// A request to the source backend failed.
    #[error("source request failed: {0}")]
    SourceConnection(String),

    /// A request to the sink backend failed.
    #[error("sink request failed: {0}")]
    SinkConnection(String),

    /// A response could not be parsed into the expected shape.
    #[error("failed to parse response: {0}")]
    Extraction(String),

    /// A manifest file is malformed.
    #[error("invalid manifest: {0}")]
    Manifest(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
