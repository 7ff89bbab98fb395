//! Display utilities and output formatting for the sessionbar CLI.

use anyhow::{Context, Result};
use clap::ValueEnum;
use sessionbar_lib::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Output format for bars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
    Ndjson,
    Parquet,
}

impl Format {
    /// Returns the library format this maps to.
    pub(crate) const fn output_format(self) -> OutputFormat {
        match self {
            Self::Csv => OutputFormat::Csv,
            Self::Json => OutputFormat::Json,
            Self::Ndjson => OutputFormat::Ndjson,
            Self::Parquet => OutputFormat::Parquet,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output_format().extension())
    }
}

/// Write bars to a file, or to stdout when no path is given.
pub(crate) fn write_output(bars: &[Bar], output: Option<&Path>, format: Format) -> Result<()> {
    let format = format.output_format();
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            sessionbar_lib::write_bars(format, bars, BufWriter::new(file))?;
        }
        None => sessionbar_lib::write_bars(format, bars, BufWriter::new(std::io::stdout()))?,
    }
    Ok(())
}

/// Joins times as `HH:MM`, `per_line` to a row.
pub(crate) fn time_grid(times: &[chrono::NaiveTime], per_line: usize) -> String {
    times
        .chunks(per_line.max(1))
        .map(|row| {
            row.iter()
                .map(|t| t.format("%H:%M").to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
