//! Series naming shared by every sink.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Interval, SessionbarError};

/// Identifies one persisted bar series: an instrument at a given interval.
///
/// Renders as `{symbol}_{interval}`, e.g. `FG705_15m`. Store collections and
/// snapshot files are both named after it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    symbol: String,
    interval: Interval,
}

impl SeriesKey {
    /// Creates a new series key.
    #[must_use]
    pub fn new(symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
        }
    }

    /// Derives the key for a source file, taking the symbol from its name.
    ///
    /// # Errors
    ///
    /// Returns [`SessionbarError::InvalidFileName`] if the file name has no
    /// non-empty prefix before an underscore.
    pub fn for_file(path: &Path, interval: Interval) -> Result<Self, SessionbarError> {
        let symbol = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(symbol_from_file_name)
            .ok_or_else(|| SessionbarError::InvalidFileName(path.to_path_buf()))?;
        Ok(Self::new(symbol, interval))
    }

    /// Returns the instrument symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the bar interval.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.interval
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.symbol, self.interval)
    }
}

impl std::str::FromStr for SeriesKey {
    type Err = SessionbarError;

    /// Parses a collection name such as `FG705_15m`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('_') {
            Some((symbol, interval)) if !symbol.is_empty() => {
                Ok(Self::new(symbol, interval.parse::<Interval>()?))
            }
            _ => Err(SessionbarError::InvalidSeriesKey(s.to_string())),
        }
    }
}

/// Extracts the instrument symbol from a source file name.
///
/// The symbol is everything before the first underscore, so
/// `FG705_1m.csv` yields `FG705`. Returns `None` when there is no
/// underscore or the prefix is empty.
#[must_use]
pub fn symbol_from_file_name(name: &str) -> Option<&str> {
    match name.find('_') {
        Some(0) | None => None,
        Some(idx) => Some(&name[..idx]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_symbol_from_file_name() {
        assert_eq!(symbol_from_file_name("FG705_1m.csv"), Some("FG705"));
        assert_eq!(symbol_from_file_name("rb1710_1m_2017.csv"), Some("rb1710"));
        assert_eq!(symbol_from_file_name("FG705.csv"), None);
        assert_eq!(symbol_from_file_name("_1m.csv"), None);
    }

    #[test]
    fn test_series_key_display() {
        let key = SeriesKey::new("FG705", Interval::MINUTE15);
        assert_eq!(key.to_string(), "FG705_15m");
        assert_eq!(key.symbol(), "FG705");
    }

    #[test]
    fn test_series_key_for_file() {
        let path = PathBuf::from("/data/1m/FG705_1m.csv");
        let key = SeriesKey::for_file(&path, Interval::MINUTE15).unwrap();
        assert_eq!(key.to_string(), "FG705_15m");

        let bad = PathBuf::from("/data/1m/FG705.csv");
        assert!(matches!(
            SeriesKey::for_file(&bad, Interval::MINUTE15),
            Err(SessionbarError::InvalidFileName(_))
        ));
    }

    #[test]
    fn test_series_key_parse() {
        let key: SeriesKey = "RU1701_30m".parse().unwrap();
        assert_eq!(key.symbol(), "RU1701");
        assert_eq!(key.interval().minutes(), 30);

        assert!(matches!(
            "RU1701".parse::<SeriesKey>(),
            Err(SessionbarError::InvalidSeriesKey(_))
        ));
        assert!(matches!(
            "RU1701_7m".parse::<SeriesKey>(),
            Err(SessionbarError::Interval(_))
        ));
    }
}
