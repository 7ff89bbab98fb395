//! Per-series snapshot files.

use sessionbar_aggregate::Bar;
use sessionbar_format::{OutputFormat, write_bars};
use sessionbar_types::SeriesKey;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{BarSink, Result, SinkError};

/// Writes each series to `{dir}/{key}.{ext}`.
///
/// The file is written under a unique temporary name in the same directory
/// and renamed into place, so a failed write never leaves a truncated
/// snapshot and concurrent writers of one key never share a temporary file.
/// An existing snapshot for the same key is replaced; the last rename wins.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
    format: OutputFormat,
}

impl SnapshotWriter {
    /// Creates a writer targeting `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Returns the output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the snapshot format.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Returns the snapshot path for `key`.
    #[must_use]
    pub fn path_for(&self, key: &SeriesKey) -> PathBuf {
        self.dir.join(format!("{key}.{}", self.format.extension()))
    }
}

impl BarSink for SnapshotWriter {
    fn write_series(&self, key: &SeriesKey, bars: &[Bar]) -> Result<usize> {
        fs::create_dir_all(&self.dir).map_err(|source| SinkError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|source| SinkError::WriteFile {
            path: self.dir.clone(),
            source,
        })?;

        // Dropping `tmp` on error removes the partial file.
        write_bars(self.format, bars, BufWriter::new(tmp.as_file_mut()))?;

        tmp.persist(&path).map_err(|e| SinkError::WriteFile {
            path: path.clone(),
            source: e.error,
        })?;

        debug!(path = %path.display(), bars = bars.len(), "wrote snapshot");
        Ok(bars.len())
    }

    fn name(&self) -> &'static str {
        "snapshot"
    }
}
