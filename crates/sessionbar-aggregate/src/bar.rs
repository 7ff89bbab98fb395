//! OHLC bar data structure.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sessionbar_types::Tick;

/// Completed OHLC bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Timestamp of the first tick accepted into the bar.
    pub open_time: NaiveDateTime,
    /// Opening price (first tick's open).
    pub open: f64,
    /// Highest price during the interval.
    pub high: f64,
    /// Lowest price during the interval.
    pub low: f64,
    /// Closing price (last accepted tick's close).
    pub close: f64,
}

impl Bar {
    /// Creates a new bar.
    #[must_use]
    pub const fn new(open_time: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
        }
    }
}

/// Bar still accumulating ticks.
#[derive(Debug, Clone)]
pub(crate) struct BarBuilder {
    open_time: NaiveDateTime,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl BarBuilder {
    /// Opens a bar from its first tick.
    pub(crate) const fn new(tick: &Tick) -> Self {
        Self {
            open_time: tick.timestamp,
            open: tick.open,
            high: tick.high,
            low: tick.low,
            close: tick.close,
        }
    }

    /// Folds a tick into the running extremes and close.
    pub(crate) fn update(&mut self, tick: &Tick) {
        self.high = self.high.max(tick.high);
        self.low = self.low.min(tick.low);
        self.close = tick.close;
    }

    pub(crate) const fn open_time(&self) -> NaiveDateTime {
        self.open_time
    }

    pub(crate) const fn finish(self) -> Bar {
        Bar::new(self.open_time, self.open, self.high, self.low, self.close)
    }
}
