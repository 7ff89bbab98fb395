//! CLI command implementations.

pub(crate) mod calendar;
pub(crate) mod convert;
pub(crate) mod run;

use anyhow::{Context, Result};
use sessionbar_lib::prelude::*;
use std::path::Path;

/// Loads the configuration file, or the defaults when none is given.
pub(crate) fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

/// Parses an interval flag.
pub(crate) fn parse_interval(s: &str) -> Result<Interval> {
    s.parse::<Interval>()
        .with_context(|| format!("Invalid interval: {s}"))
}
