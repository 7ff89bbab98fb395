//! Single-file processing.

use sessionbar_aggregate::{AggregatorState, Bar, BarAggregator, SessionCalendar};
use sessionbar_parse::{ReadStats, RecordReader, ValidationMode};
use sessionbar_sink::{BarSink, SnapshotWriter, SqliteStore};
use sessionbar_types::SeriesKey;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{PipelineConfig, PipelineError, Result};

/// Bars produced from one source file.
#[derive(Debug, Clone)]
pub struct FileOutput {
    /// The source file.
    pub path: PathBuf,
    /// Series the bars belong to.
    pub key: SeriesKey,
    /// Completed bars in time order.
    pub bars: Vec<Bar>,
    /// Reader counters.
    pub stats: ReadStats,
}

/// Summary of one successfully processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    /// The source file.
    pub path: PathBuf,
    /// Series the bars were written to.
    pub key: SeriesKey,
    /// Number of bars produced.
    pub bars: usize,
    /// Reader counters.
    pub stats: ReadStats,
}

/// Reads one source file and aggregates it into bars.
///
/// Aggregation state is created fresh for the file, so nothing carries over
/// between instruments.
///
/// # Errors
///
/// Returns an error if the file name yields no symbol, the file cannot be
/// read, or a malformed record is found in strict mode.
pub fn aggregate_file(
    path: &Path,
    calendar: &SessionCalendar,
    mode: ValidationMode,
) -> Result<FileOutput> {
    let key = SeriesKey::for_file(path, calendar.interval())?;
    let mut reader = RecordReader::open(path, mode).map_err(|source| PipelineError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let aggregator = BarAggregator::new(calendar);
    let mut state = AggregatorState::new();
    let mut bars = Vec::new();

    for tick in reader.by_ref() {
        let tick = tick.map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        bars.extend(aggregator.accept(&mut state, &tick));
    }
    bars.extend(aggregator.flush(&mut state));

    Ok(FileOutput {
        path: path.to_path_buf(),
        key,
        bars,
        stats: reader.stats(),
    })
}

/// Aggregates files and persists each series to a list of sinks.
///
/// Cloning is cheap; clones share the calendar and sinks.
#[derive(Clone)]
pub struct Pipeline {
    calendar: Arc<SessionCalendar>,
    mode: ValidationMode,
    parallel: usize,
    sinks: Vec<Arc<dyn BarSink>>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("interval", &self.calendar.interval())
            .field("mode", &self.mode)
            .field("parallel", &self.parallel)
            .field("sinks", &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl Pipeline {
    /// Creates a pipeline with no sinks.
    #[must_use]
    pub fn new(calendar: SessionCalendar, mode: ValidationMode) -> Self {
        Self {
            calendar: Arc::new(calendar),
            mode,
            parallel: 1,
            sinks: Vec::new(),
        }
    }

    /// Builds a pipeline from configuration, opening the configured sinks.
    ///
    /// Snapshot files are written before the store, so a store failure
    /// still leaves a readable snapshot behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the store cannot
    /// be opened.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let calendar = config.schedule.to_calendar()?;
        let mut pipeline = Self::new(calendar, config.validation).with_parallelism(config.parallel_files);

        if config.snapshot.enabled {
            pipeline = pipeline.with_sink(SnapshotWriter::new(
                config.snapshot.dir.clone(),
                config.snapshot.format,
            ));
        }
        if config.store.enabled {
            let path = config.store.resolved_path();
            let store = SqliteStore::open(&path).map_err(|source| PipelineError::Sink {
                sink: "sqlite",
                key: path.display().to_string(),
                source,
            })?;
            pipeline = pipeline.with_sink(store);
        }
        Ok(pipeline)
    }

    /// Adds a sink. Sinks are written in the order they are added.
    #[must_use]
    pub fn with_sink(mut self, sink: impl BarSink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Adds a shared sink.
    #[must_use]
    pub fn with_shared_sink(mut self, sink: Arc<dyn BarSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Sets how many files may be processed at once (minimum 1).
    #[must_use]
    pub fn with_parallelism(mut self, parallel: usize) -> Self {
        self.parallel = parallel.max(1);
        self
    }

    /// Returns the session calendar.
    #[must_use]
    pub fn calendar(&self) -> &SessionCalendar {
        &self.calendar
    }

    /// Returns the validation mode.
    #[must_use]
    pub const fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Returns the file parallelism.
    #[must_use]
    pub const fn parallelism(&self) -> usize {
        self.parallel
    }

    /// Writes a series to every sink in order.
    ///
    /// # Errors
    ///
    /// Returns the first sink failure; later sinks are not attempted.
    pub fn persist(&self, key: &SeriesKey, bars: &[Bar]) -> Result<()> {
        for sink in &self.sinks {
            sink.write_series(key, bars).map_err(|source| {
                warn!(sink = sink.name(), key = %key, error = %source, "sink write failed");
                PipelineError::Sink {
                    sink: sink.name(),
                    key: key.to_string(),
                    source,
                }
            })?;
        }
        Ok(())
    }

    /// Aggregates one file and persists its bars.
    ///
    /// # Errors
    ///
    /// Returns an error if aggregation or any sink fails. Failures affect
    /// only this file.
    pub fn process_file(&self, path: &Path) -> Result<FileReport> {
        let output = aggregate_file(path, &self.calendar, self.mode)?;
        self.persist(&output.key, &output.bars)?;

        info!(
            file = %path.display(),
            key = %output.key,
            bars = output.bars.len(),
            records = output.stats.records,
            skipped = output.stats.skipped,
            "processed file"
        );

        Ok(FileReport {
            path: output.path,
            key: output.key,
            bars: output.bars.len(),
            stats: output.stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sessionbar_sink::{MemorySink, SinkError, SqliteStore};
    use sessionbar_types::Interval;
    use std::fs;
    use tempfile::tempdir;

    /// Sink that rejects every series.
    struct RejectingSink;

    impl BarSink for RejectingSink {
        fn write_series(&self, _key: &SeriesKey, _bars: &[Bar]) -> sessionbar_sink::Result<usize> {
            Err(SinkError::WriteFile {
                path: PathBuf::from("rejected"),
                source: std::io::Error::other("disk full"),
            })
        }

        fn name(&self) -> &'static str {
            "rejecting"
        }
    }

    const SAMPLE: &str = "\
20161010,0.0900,100,105,99,101
20161010,0.0901,101,103,100,102
20161010,0.0902,-5,103,100,102
20161010,0.0914,102,104,101,103
20161010,0.0915,103,106,102,105
";

    #[test]
    fn test_aggregate_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("FG705_1m.csv");
        fs::write(&path, SAMPLE).unwrap();

        let calendar = SessionCalendar::default();
        let output = aggregate_file(&path, &calendar, ValidationMode::Lenient).unwrap();

        assert_eq!(output.key, SeriesKey::new("FG705", Interval::MINUTE15));
        assert_eq!(output.stats.records, 4);
        assert_eq!(output.stats.skipped, 1);
        assert_eq!(output.bars.len(), 2);

        let first = output.bars[0];
        assert_relative_eq!(first.open, 100.0);
        assert_relative_eq!(first.high, 105.0);
        assert_relative_eq!(first.low, 99.0);
        assert_relative_eq!(first.close, 103.0);

        // The 09:15 bar is still open at end of file and is flushed.
        assert_eq!(output.bars[1].open_time.format("%H:%M").to_string(), "09:15");
        assert_relative_eq!(output.bars[1].close, 105.0);
    }

    #[test]
    fn test_strict_mode_fails_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("FG705_1m.csv");
        fs::write(&path, SAMPLE).unwrap();

        let result = aggregate_file(&path, &SessionCalendar::default(), ValidationMode::Strict);
        assert!(matches!(result, Err(PipelineError::Read { .. })));
    }

    #[test]
    fn test_bad_file_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nounderscore.csv");
        fs::write(&path, SAMPLE).unwrap();

        let result = aggregate_file(&path, &SessionCalendar::default(), ValidationMode::Lenient);
        assert!(matches!(result, Err(PipelineError::Key(_))));
    }

    #[test]
    fn test_process_file_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("FG705_1m.csv");
        fs::write(&path, SAMPLE).unwrap();

        let sink = Arc::new(MemorySink::new());
        let pipeline = Pipeline::new(SessionCalendar::default(), ValidationMode::Lenient)
            .with_shared_sink(sink.clone());

        let report = pipeline.process_file(&path).unwrap();
        assert_eq!(report.bars, 2);
        assert_eq!(sink.bars(&report.key).unwrap().len(), 2);
    }

    #[test]
    fn test_rerun_is_deterministic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("FG705_1m.csv");
        fs::write(&path, SAMPLE).unwrap();

        let calendar = SessionCalendar::default();
        let a = aggregate_file(&path, &calendar, ValidationMode::Lenient).unwrap();
        let b = aggregate_file(&path, &calendar, ValidationMode::Lenient).unwrap();
        assert_eq!(a.bars, b.bars);
    }

    #[test]
    fn test_sink_failure_stops_later_sinks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("FG705_1m.csv");
        fs::write(&path, SAMPLE).unwrap();

        let after = Arc::new(MemorySink::new());
        let pipeline = Pipeline::new(SessionCalendar::default(), ValidationMode::Lenient)
            .with_sink(RejectingSink)
            .with_shared_sink(after.clone());

        let err = pipeline.process_file(&path).unwrap_err();
        match err {
            PipelineError::Sink { sink, key, .. } => {
                assert_eq!(sink, "rejecting");
                assert_eq!(key, "FG705_15m");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(after.keys().unwrap().is_empty());
    }

    #[test]
    fn test_failed_store_write_leaves_no_rows() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let pipeline = Pipeline::new(SessionCalendar::default(), ValidationMode::Lenient)
            .with_shared_sink(store.clone());

        let key = SeriesKey::new("FG705", Interval::MINUTE15);
        let ts = chrono::NaiveDate::from_ymd_opt(2016, 10, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        // NaN binds as NULL and violates the NOT NULL close column.
        let bars = [
            Bar::new(ts, 100.0, 105.0, 99.0, 101.0),
            Bar::new(ts + chrono::TimeDelta::minutes(15), 101.0, 102.0, 100.0, f64::NAN),
        ];

        let result = pipeline.persist(&key, &bars);
        assert!(matches!(result, Err(PipelineError::Sink { sink: "sqlite", .. })));
        assert_eq!(store.count("FG705_15m").unwrap(), 0);
    }
}
