//! Common error types for Scribe

use thiserror::Error;

/// Common result type for Scribe operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Scribe services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Section name outside the manuscript's fixed set
    #[error("Unknown section: {0}")]
    UnknownSection(String),

    /// A stored row holds a value that no longer parses (id, timestamp, state)
    #[error("Malformed stored record: {0}")]
    MalformedRecord(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
