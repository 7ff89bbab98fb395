//! Line-oriented record reader.

use serde::{Deserialize, Serialize};
use sessionbar_types::Tick;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::{ParseError, parse_record};

/// How malformed records are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Skip malformed records and keep reading.
    #[default]
    Lenient,
    /// Stop at the first malformed record.
    Strict,
}

/// Errors surfaced by [`RecordReader`].
#[derive(Error, Debug)]
pub enum ReadError {
    /// Reading from the underlying source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A malformed record was found in strict mode.
    #[error("Malformed record at line {line}: {source}")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// What was wrong with the record.
        source: ParseError,
    },
}

/// Counters describing one pass over a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadStats {
    /// Lines read, including blank and malformed ones.
    pub lines: usize,
    /// Records parsed into ticks.
    pub records: usize,
    /// Malformed records skipped.
    pub skipped: usize,
}

/// Iterator over the ticks of a line-oriented source.
///
/// Blank lines are ignored. Malformed records are logged at debug level and
/// skipped, or returned as [`ReadError::Malformed`] in
/// [`ValidationMode::Strict`]. Bytes that are not valid UTF-8 are replaced
/// rather than failing the read.
#[derive(Debug)]
pub struct RecordReader<R> {
    reader: R,
    buf: Vec<u8>,
    mode: ValidationMode,
    stats: ReadStats,
}

impl RecordReader<BufReader<File>> {
    /// Opens a file for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, mode: ValidationMode) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), mode))
    }
}

impl<R: BufRead> RecordReader<R> {
    /// Creates a reader over any buffered source.
    #[must_use]
    pub const fn new(reader: R, mode: ValidationMode) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            mode,
            stats: ReadStats {
                lines: 0,
                records: 0,
                skipped: 0,
            },
        }
    }

    /// Returns the counters accumulated so far.
    #[must_use]
    pub const fn stats(&self) -> ReadStats {
        self.stats
    }

    /// Returns the validation mode.
    #[must_use]
    pub const fn mode(&self) -> ValidationMode {
        self.mode
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Tick, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(ReadError::Io(e))),
            }
            self.stats.lines += 1;

            let text = String::from_utf8_lossy(&self.buf);
            let line = if self.stats.lines == 1 {
                text.trim_start_matches('\u{feff}')
            } else {
                text.as_ref()
            };

            match parse_record(line) {
                Ok(tick) => {
                    self.stats.records += 1;
                    return Some(Ok(tick));
                }
                Err(ParseError::Empty) => {}
                Err(source) => {
                    self.stats.skipped += 1;
                    debug!(line = self.stats.lines, error = %source, "skipping malformed record");
                    if self.mode == ValidationMode::Strict {
                        return Some(Err(ReadError::Malformed {
                            line: self.stats.lines,
                            source,
                        }));
                    }
                }
            }
        }
    }
}
