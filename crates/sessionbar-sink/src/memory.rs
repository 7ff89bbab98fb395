//! In-memory sink.

use sessionbar_aggregate::Bar;
use sessionbar_types::SeriesKey;
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::{BarSink, Result, SinkError};

/// Sink that keeps every written series in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    series: Mutex<BTreeMap<SeriesKey, Vec<Bar>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the bars stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn bars(&self, key: &SeriesKey) -> Result<Vec<Bar>> {
        let series = self.series.lock().map_err(|_| SinkError::Poisoned)?;
        Ok(series.get(key).cloned().unwrap_or_default())
    }

    /// Returns every key written so far, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn keys(&self) -> Result<Vec<SeriesKey>> {
        let series = self.series.lock().map_err(|_| SinkError::Poisoned)?;
        Ok(series.keys().cloned().collect())
    }
}

impl BarSink for MemorySink {
    fn write_series(&self, key: &SeriesKey, bars: &[Bar]) -> Result<usize> {
        let mut series = self.series.lock().map_err(|_| SinkError::Poisoned)?;
        series.entry(key.clone()).or_default().extend_from_slice(bars);
        Ok(bars.len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
