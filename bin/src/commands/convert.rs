//! Single-file convert command.

use crate::display::{Format, write_output};
use anyhow::{Context, Result};
use sessionbar_lib::aggregate_file;
use sessionbar_lib::prelude::*;
use std::path::Path;

use super::parse_interval;

/// Aggregate one source file and write its bars.
///
/// Nothing is persisted to the store; this is a preview of what a run
/// would produce for the file.
pub(crate) fn convert(
    config: &PipelineConfig,
    input: &Path,
    output: Option<&Path>,
    format: Format,
    interval: Option<&str>,
    strict: bool,
    quiet: bool,
) -> Result<()> {
    let mut schedule = config.schedule.clone();
    if let Some(interval) = interval {
        schedule.interval_minutes = parse_interval(interval)?.minutes();
    }
    let calendar = schedule.to_calendar().context("Invalid session schedule")?;
    let mode = if strict {
        ValidationMode::Strict
    } else {
        config.validation
    };

    let result = aggregate_file(input, &calendar, mode)
        .with_context(|| format!("Failed to aggregate {}", input.display()))?;
    write_output(&result.bars, output, format)?;

    if !quiet {
        eprintln!(
            "{}: {} bars from {} records ({} skipped)",
            result.key,
            result.bars.len(),
            result.stats.records,
            result.stats.skipped
        );
    }

    Ok(())
}
