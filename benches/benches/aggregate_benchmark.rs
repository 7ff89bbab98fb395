//! Aggregation throughput benchmarks.
//!
//! Run with: `cargo bench --package sessionbar-bench`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sessionbar_bench::{SyntheticConfig, synthetic_ticks, write_source_file};
use sessionbar_lib::{
    BarSink, Interval, MemorySink, OutputFormat, SeriesKey, SessionCalendar, SqliteStore,
    ValidationMode, aggregate_file, aggregate_ticks, write_bars,
};
use std::hint::black_box;
use tempfile::TempDir;

/// Data sizes in trading days.
const DAY_COUNTS: [u32; 3] = [1, 20, 250];

fn config(days: u32) -> SyntheticConfig {
    SyntheticConfig {
        days,
        ..SyntheticConfig::default()
    }
}

fn aggregate_benchmark(c: &mut Criterion) {
    let calendar = SessionCalendar::default();
    let mut group = c.benchmark_group("aggregate");

    for days in DAY_COUNTS {
        let ticks = synthetic_ticks(&config(days));
        group.throughput(Throughput::Elements(ticks.len() as u64));
        group.bench_with_input(BenchmarkId::new("in_memory", days), &ticks, |b, ticks| {
            b.iter(|| aggregate_ticks(&calendar, black_box(ticks.iter().copied())));
        });
    }

    group.finish();
}

fn file_benchmark(c: &mut Criterion) {
    let calendar = SessionCalendar::default();
    let dir = TempDir::new().unwrap();
    let mut group = c.benchmark_group("parse_and_aggregate");

    for days in DAY_COUNTS {
        let ticks = synthetic_ticks(&config(days));
        let path = write_source_file(dir.path(), &format!("FG{days}"), &ticks).unwrap();
        group.throughput(Throughput::Elements(ticks.len() as u64));
        group.bench_with_input(BenchmarkId::new("file", days), &path, |b, path| {
            b.iter(|| aggregate_file(black_box(path), &calendar, ValidationMode::Lenient).unwrap());
        });
    }

    group.finish();
}

fn sink_benchmark(c: &mut Criterion) {
    let calendar = SessionCalendar::default();
    let bars = aggregate_ticks(&calendar, synthetic_ticks(&config(250)));
    let key = SeriesKey::new("FG705", Interval::MINUTE15);

    let mut group = c.benchmark_group("sink");
    group.throughput(Throughput::Elements(bars.len() as u64));

    group.bench_function("json", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(bars.len() * 96);
            write_bars(OutputFormat::Json, black_box(&bars), &mut out).unwrap();
            out
        });
    });

    group.bench_function("memory", |b| {
        b.iter(|| MemorySink::new().write_series(&key, black_box(&bars)).unwrap());
    });

    group.bench_function("sqlite_in_memory", |b| {
        b.iter(|| {
            let store = SqliteStore::open_in_memory().unwrap();
            store.write_series(&key, black_box(&bars)).unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, aggregate_benchmark, file_benchmark, sink_benchmark);
criterion_main!(benches);
