//! Pipeline error types.

use sessionbar_parse::ReadError;
use sessionbar_sink::SinkError;
use sessionbar_types::SessionbarError;
use std::path::PathBuf;
use thiserror::Error;

use crate::ConfigError;

/// Errors raised while processing files.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The series key could not be derived for a file.
    #[error(transparent)]
    Key(#[from] SessionbarError),

    /// The input directory could not be listed.
    #[error("Failed to scan '{path}': {source}")]
    Scan {
        /// The directory being scanned.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A source file could not be opened.
    #[error("Failed to open '{path}': {source}")]
    Open {
        /// The source file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A source file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Read {
        /// The source file.
        path: PathBuf,
        /// The underlying read error.
        source: ReadError,
    },

    /// A sink rejected a series.
    #[error("{sink} sink failed for {key}: {source}")]
    Sink {
        /// Name of the failing sink.
        sink: &'static str,
        /// The series being written.
        key: String,
        /// The underlying sink error.
        source: SinkError,
    },

    /// A worker task panicked or was aborted.
    #[error("Worker task failed: {0}")]
    Task(String),

    /// The file was not started because the batch was cancelled.
    #[error("Cancelled")]
    Cancelled,
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
