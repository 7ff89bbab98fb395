//! Batch processing for sessionbar.
//!
//! - [`PipelineConfig`] - Run configuration loaded from JSON
//! - [`scan_input_dir`] - Source file discovery
//! - [`Pipeline`] - Per-file aggregation and persistence
//! - [`BatchReport`] - Per-file outcomes of a concurrent run

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sessionbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod process;
mod run;
mod scan;

pub use config::{ConfigError, PipelineConfig, ScheduleConfig, SnapshotConfig, StoreConfig};
pub use error::{PipelineError, Result};
pub use process::{FileOutput, FileReport, Pipeline, aggregate_file};
pub use run::{BatchReport, CancelFlag, FileOutcome};
pub use scan::scan_input_dir;
