//! Bar persistence for sessionbar.
//!
//! - [`BarSink`] - Destination for completed bar series
//! - [`SqliteStore`] - Append-only document store, one collection per series
//! - [`MemorySink`] - In-process sink
//! - [`SnapshotWriter`] - One formatted file per series

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sessionbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod memory;
mod sink;
mod snapshot;
mod store;

pub use error::{Result, SinkError};
pub use memory::MemorySink;
pub use sink::BarSink;
pub use snapshot::SnapshotWriter;
pub use store::SqliteStore;
