//! Sink abstraction.

use sessionbar_aggregate::Bar;
use sessionbar_types::SeriesKey;

use crate::Result;

/// A destination for completed bar series.
///
/// Implementations receive the full ordered bar sequence of one series and
/// append every bar as an independent record. Nothing is deduplicated, so
/// writing the same series twice stores it twice.
pub trait BarSink: Send + Sync {
    /// Appends `bars` to the collection named by `key`.
    ///
    /// Returns the number of bars written.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. Implementations must not leave a
    /// partially written series behind.
    fn write_series(&self, key: &SeriesKey, bars: &[Bar]) -> Result<usize>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
