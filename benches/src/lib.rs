//! Benchmark utilities for sessionbar.
//!
//! Generates deterministic one-minute data shaped like a commodity futures
//! trading day, either as ticks in memory or as a source file on disk.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sessionbar_lib::Tick;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Trading windows of a synthetic day as `(open, close)` minutes of day.
const SESSIONS: [(u32, u32); 4] = [
    (9 * 60, 10 * 60 + 15),
    (10 * 60 + 30, 11 * 60 + 30),
    (13 * 60 + 30, 15 * 60),
    (21 * 60, 23 * 60),
];

/// Parameters for synthetic data.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    /// First trading day.
    pub start: NaiveDate,
    /// Number of consecutive days.
    pub days: u32,
    /// Starting price.
    pub price: f64,
    /// Seed for the price walk.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2016, 10, 10).unwrap_or_default(),
            days: 1,
            price: 1200.0,
            seed: 0x5eed,
        }
    }
}

/// Generates one tick per trading minute.
pub fn synthetic_ticks(config: &SyntheticConfig) -> Vec<Tick> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut price = config.price;
    let mut ticks = Vec::new();

    for day in 0..config.days {
        let date = config.start + TimeDelta::days(i64::from(day));
        for &(open, close) in &SESSIONS {
            for minute in open..close {
                let Some(time) = NaiveTime::from_hms_opt(minute / 60, minute % 60, 0) else {
                    continue;
                };
                let step: f64 = rng.random_range(-1.0..1.0);
                let open_px = price;
                let close_px = (price + step).max(1.0);
                let high = open_px.max(close_px) + rng.random::<f64>();
                let low = (open_px.min(close_px) - rng.random::<f64>()).max(0.5);
                ticks.push(Tick::new(
                    NaiveDateTime::new(date, time),
                    open_px,
                    high,
                    low,
                    close_px,
                ));
                price = close_px;
            }
        }
    }
    ticks
}

/// Renders ticks in the comma-separated source layout.
pub fn render_source(ticks: &[Tick]) -> String {
    let mut out = String::with_capacity(ticks.len() * 48);
    for tick in ticks {
        let ts = tick.timestamp;
        let hhmm = f64::from(ts.format("%H%M").to_string().parse::<u32>().unwrap_or(0)) / 10_000.0;
        let _ = writeln!(
            out,
            "{},{:.4},{:.2},{:.2},{:.2},{:.2}",
            ts.format("%Y%m%d"),
            hhmm,
            tick.open,
            tick.high,
            tick.low,
            tick.close
        );
    }
    out
}

/// Writes a source file named `{symbol}_1m.csv` into `dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_source_file(dir: &Path, symbol: &str, ticks: &[Tick]) -> std::io::Result<PathBuf> {
    let path = dir.join(format!("{symbol}_1m.csv"));
    std::fs::write(&path, render_source(ticks))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessionbar_lib::{SessionCalendar, aggregate_ticks, parse_record};

    #[test]
    fn test_synthetic_day_shape() {
        let ticks = synthetic_ticks(&SyntheticConfig::default());
        assert_eq!(ticks.len(), 75 + 60 + 90 + 120);
        assert!(ticks.iter().all(Tick::is_valid));

        // Every session spans whole 15-minute bars.
        let bars = aggregate_ticks(&SessionCalendar::default(), ticks);
        assert_eq!(bars.len(), 5 + 4 + 6 + 8);
    }

    #[test]
    fn test_same_seed_same_ticks() {
        let config = SyntheticConfig::default();
        assert_eq!(synthetic_ticks(&config), synthetic_ticks(&config));

        let other = SyntheticConfig {
            seed: config.seed + 1,
            ..config.clone()
        };
        assert_ne!(synthetic_ticks(&config), synthetic_ticks(&other));
    }

    #[test]
    fn test_rendered_lines_parse() {
        let ticks = synthetic_ticks(&SyntheticConfig::default());
        let source = render_source(&ticks[..3]);
        for (line, tick) in source.lines().zip(&ticks) {
            let parsed = parse_record(line).unwrap();
            assert_eq!(parsed.timestamp, tick.timestamp);
        }
    }
}
