//! Core types for the sessionbar resampler.
//!
//! This crate provides the fundamental data structures used throughout sessionbar:
//!
//! - [`Tick`] - A single minute-resolution OHLC price record
//! - [`Interval`] - Bar length aligned to the session calendar
//! - [`SeriesKey`] - Instrument + interval key naming persisted output
//! - [`SessionbarError`] - Shared error type

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sessionbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod interval;
mod series;
mod tick;

pub use error::{Result, SessionbarError};
pub use interval::{Interval, IntervalParseError};
pub use series::{SeriesKey, symbol_from_file_name};
pub use tick::Tick;
