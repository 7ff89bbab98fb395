//! Bar interval definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Length of one aggregation interval, in minutes.
///
/// Only lengths that divide an hour evenly are representable, so the regular
/// boundary rule `minute % length == 0` tiles every hour identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Interval(u32);

impl Interval {
    /// The 15-minute interval used by the default session schedule.
    pub const MINUTE15: Self = Self(15);

    /// Creates an interval of the given number of minutes.
    ///
    /// Returns `None` unless `minutes` is a divisor of 60.
    #[must_use]
    pub const fn new(minutes: u32) -> Option<Self> {
        if minutes > 0 && minutes <= 60 && 60 % minutes == 0 {
            Some(Self(minutes))
        } else {
            None
        }
    }

    /// Returns the interval length in minutes.
    #[must_use]
    pub const fn minutes(&self) -> u32 {
        self.0
    }

    /// Returns the label used in series keys, e.g. `15m`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}m", self.0)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::MINUTE15
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.0)
    }
}

impl FromStr for Interval {
    type Err = IntervalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let digits = lower
            .strip_suffix("min")
            .or_else(|| lower.strip_suffix('m'))
            .or_else(|| lower.strip_prefix('m'))
            .unwrap_or(&lower);

        digits
            .parse::<u32>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| IntervalParseError(s.to_string()))
    }
}

impl TryFrom<u32> for Interval {
    type Error = IntervalParseError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::new(minutes).ok_or_else(|| IntervalParseError(minutes.to_string()))
    }
}

impl From<Interval> for u32 {
    fn from(interval: Interval) -> Self {
        interval.0
    }
}

/// Error returned when parsing an invalid interval string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalParseError(String);

impl std::fmt::Display for IntervalParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid interval '{}', expected a minute count dividing 60 (e.g. 5m, 15m, 30m)",
            self.0
        )
    }
}

impl std::error::Error for IntervalParseError {}
