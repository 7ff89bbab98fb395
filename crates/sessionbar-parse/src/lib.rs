//! Minute-record parsing for sessionbar.
//!
//! This crate provides the ingestion side of the pipeline:
//!
//! - [`parse_record`] - Parses one delimited line into a [`Tick`](sessionbar_types::Tick)
//! - [`RecordReader`] - Iterates the records of a reader, skipping malformed lines
//! - [`ValidationMode`] - Best-effort or strict handling of malformed lines

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sessionbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod reader;
mod record;

pub use reader::{ReadError, ReadStats, RecordReader, ValidationMode};
pub use record::{ParseError, detect_delimiter, parse_record};
