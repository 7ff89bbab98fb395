//! Error types for sessionbar.

use std::path::PathBuf;
use thiserror::Error;

use crate::IntervalParseError;

/// Result type alias for sessionbar operations.
pub type Result<T> = std::result::Result<T, SessionbarError>;

/// Errors shared across the sessionbar crates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionbarError {
    /// The instrument symbol could not be derived from a file name.
    #[error("Cannot derive instrument symbol from file name '{}'", .0.display())]
    InvalidFileName(PathBuf),

    /// A series key is not of the form `{symbol}_{interval}`.
    #[error("Invalid series key '{0}'")]
    InvalidSeriesKey(String),

    /// Invalid bar interval.
    #[error(transparent)]
    Interval(#[from] IntervalParseError),
}
