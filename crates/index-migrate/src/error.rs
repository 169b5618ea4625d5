//! Error types for index migration operations.

use thiserror::Error;

/// Main error type for migration and administration operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration (bad options file, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The service rejected the credentials.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The service rate-limited the request; retry after the given seconds.
    #[error("Rate limited, retry after {0}s")]
    RateLimit(u64),

    /// Non-success response from the service API.
    #[error("Service error {status}: {message}")]
    Api { status: u16, message: String },

    /// A write task never reached the published state.
    #[error("Task {0} did not complete: {1}")]
    Task(u64, String),

    /// Failure reading or writing settings, synonyms, or rules.
    #[error("Config transfer failed: {0}")]
    ConfigTransfer(String),

    /// Failure from the streaming export cursor.
    #[error("Export failed: {0}")]
    Export(String),

    /// Failure writing a batch of records to the destination.
    #[error("Batch write failed: {0}")]
    Write(String),

    /// Failure raised by a record transformation hook.
    #[error("Transformation failed: {0}")]
    Transform(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error (file operations).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, Error>;
