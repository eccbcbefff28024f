//! Error types for SlateKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SlateError
pub type Result<T> = std::result::Result<T, SlateError>;

/// Unified error type for SlateKV operations
#[derive(Debug, Error)]
pub enum SlateError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record / Log Errors
    // -------------------------------------------------------------------------
    /// Header or payload truncated relative to its declared lengths.
    #[error("Malformed record at offset {offset}: {reason}")]
    MalformedRecord { offset: u64, reason: String },

    /// No bytes at all at the requested offset. Terminates scans.
    #[error("End of log at offset {0}")]
    EndOfLog(u64),

    #[error("Record too large: {0}")]
    RecordTooLarge(String),

    // -------------------------------------------------------------------------
    // Collection Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    KeyNotFound,

    #[error("Collection '{0}' has been dropped")]
    CollectionDropped(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Invalid collection name: {0:?}")]
    InvalidCollectionName(String),

    #[error("Invalid key pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Connection failure: {0}")]
    Connection(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    /// An error response reported by a remote server
    #[error("Server error: {0}")]
    Server(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SlateError {
    fn from(err: serde_json::Error) -> Self {
        SlateError::Serialization(err.to_string())
    }
}

impl SlateError {
    /// Shorthand for a `MalformedRecord` error
    pub(crate) fn malformed(offset: u64, reason: impl Into<String>) -> Self {
        SlateError::MalformedRecord {
            offset,
            reason: reason.into(),
        }
    }
}
