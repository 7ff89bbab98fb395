//! Session-aligned OHLC bar resampling for commodity futures.
//!
//! This is a facade crate that re-exports functionality from the sessionbar
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```
//! use sessionbar_lib::prelude::*;
//!
//! let calendar = SessionCalendar::default();
//! let day = chrono::NaiveDate::from_ymd_opt(2016, 10, 10).unwrap();
//! let ticks = [(9, 0, 101.0), (9, 1, 102.0), (9, 14, 103.0)].map(|(h, m, close)| {
//!     Tick::new(day.and_hms_opt(h, m, 0).unwrap(), 100.0, 105.0, 99.0, close)
//! });
//!
//! let bars = aggregate_ticks(&calendar, ticks);
//! assert_eq!(bars.len(), 1);
//! assert_eq!(bars[0].close, 103.0);
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sessionbar/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use sessionbar_types::*;

// Re-export calendar and aggregation
pub use sessionbar_aggregate::{
    AggregatorState, Bar, BarAggregator, BarStream, BoundaryRule, CalendarError, RuleKind,
    SessionCalendar, SessionSchedule, aggregate_ticks,
};

// Re-export record parsing
#[cfg(feature = "parse")]
pub use sessionbar_parse::{
    ParseError, ReadError, ReadStats, RecordReader, ValidationMode, detect_delimiter,
    parse_record,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use sessionbar_format::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat, write_bars,
};

#[cfg(feature = "parquet")]
pub use sessionbar_format::ParquetFormatter;

// Re-export sinks
#[cfg(feature = "sink")]
pub use sessionbar_sink::{BarSink, MemorySink, SinkError, SnapshotWriter, SqliteStore};

// Re-export batch processing
#[cfg(feature = "pipeline")]
pub use sessionbar_pipeline::{
    BatchReport, CancelFlag, ConfigError, FileOutcome, FileOutput, FileReport, Pipeline,
    PipelineConfig, PipelineError, ScheduleConfig, SnapshotConfig, StoreConfig, aggregate_file,
    scan_input_dir,
};

/// Prelude module for convenient imports.
///
/// ```
/// use sessionbar_lib::prelude::*;
/// ```
pub mod prelude {
    pub use sessionbar_types::{Interval, SeriesKey, SessionbarError, Tick};

    pub use sessionbar_aggregate::{
        AggregatorState, Bar, BarAggregator, SessionCalendar, SessionSchedule, aggregate_ticks,
    };

    #[cfg(feature = "parse")]
    pub use sessionbar_parse::{RecordReader, ValidationMode};

    #[cfg(feature = "format")]
    pub use sessionbar_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(feature = "parquet")]
    pub use sessionbar_format::ParquetFormatter;

    #[cfg(feature = "sink")]
    pub use sessionbar_sink::{BarSink, SnapshotWriter, SqliteStore};

    #[cfg(feature = "pipeline")]
    pub use sessionbar_pipeline::{CancelFlag, Pipeline, PipelineConfig, scan_input_dir};
}
