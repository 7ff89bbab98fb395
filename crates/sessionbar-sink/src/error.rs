//! Sink error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while persisting bars.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Failed to create a directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Database error.
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// A stored document could not be decoded.
    #[error("Corrupt document in collection '{collection}': {source}")]
    Document {
        /// The collection holding the document.
        collection: String,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot formatting error.
    #[error("Format error: {0}")]
    Format(#[from] sessionbar_format::FormatError),

    /// The store connection lock was poisoned by a panicking writer.
    #[error("Store connection lock poisoned")]
    Poisoned,
}

/// Result type for sink operations.
pub type Result<T> = std::result::Result<T, SinkError>;
