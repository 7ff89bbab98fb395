//! Tick data representation.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// A single minute-resolution price record.
///
/// Timestamps are exchange-local wall-clock times; the session calendar is
/// defined in the same frame, so no time zone is attached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Timestamp of the record.
    pub timestamp: NaiveDateTime,
    /// Opening price of the minute.
    pub open: f64,
    /// Highest price of the minute.
    pub high: f64,
    /// Lowest price of the minute.
    pub low: f64,
    /// Closing price of the minute.
    pub close: f64,
}

impl Tick {
    /// Creates a new tick.
    #[must_use]
    pub const fn new(timestamp: NaiveDateTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// Returns true if every price is finite and strictly positive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
    }

    /// Returns the timestamp truncated to the minute.
    #[must_use]
    pub fn minute(&self) -> NaiveDateTime {
        self.timestamp
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 10, 10)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn test_valid_tick() {
        let tick = Tick::new(at(9, 0, 0), 100.0, 105.0, 99.0, 102.0);
        assert!(tick.is_valid());
    }

    #[test]
    fn test_non_positive_price_is_invalid() {
        assert!(!Tick::new(at(9, 0, 0), -5.0, 105.0, 99.0, 102.0).is_valid());
        assert!(!Tick::new(at(9, 0, 0), 100.0, 105.0, 0.0, 102.0).is_valid());
        assert!(!Tick::new(at(9, 0, 0), 100.0, f64::NAN, 99.0, 102.0).is_valid());
    }

    #[test]
    fn test_minute_truncation() {
        let tick = Tick::new(at(9, 14, 37), 1.0, 1.0, 1.0, 1.0);
        assert_eq!(tick.minute(), at(9, 14, 0));
    }
}
