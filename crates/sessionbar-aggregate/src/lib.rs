//! Session-aligned OHLC aggregation for sessionbar.
//!
//! This crate provides the bar-aggregation engine:
//!
//! - [`SessionCalendar`] - Interval-start classification from a session table
//! - [`BarAggregator`] - Tick-by-tick state machine over [`AggregatorState`]
//! - [`BarStream`] - Lazy iterator of completed bars
//! - [`Bar`] - OHLC bar data structure

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sessionbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod bar;
mod calendar;

pub use aggregator::{AggregatorState, BarAggregator, BarStream, aggregate_ticks};
pub use bar::Bar;
pub use calendar::{BoundaryRule, CalendarError, RuleKind, SessionCalendar, SessionSchedule};
