//! Batch run command.
//!
//! Aggregates every source file in the input directory and persists each
//! instrument's bars to the configured snapshot directory and store.

use crate::display::Format;
use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use sessionbar_lib::prelude::*;
use std::path::PathBuf;
use tracing::info;

use super::parse_interval;

/// Flag values that override the configuration file.
#[derive(Debug, Default)]
pub(crate) struct RunOverrides {
    pub(crate) input_dir: Option<PathBuf>,
    pub(crate) output_dir: Option<PathBuf>,
    pub(crate) format: Option<Format>,
    pub(crate) extension: Option<String>,
    pub(crate) interval: Option<String>,
    pub(crate) store: Option<PathBuf>,
    pub(crate) no_store: bool,
    pub(crate) no_snapshot: bool,
    pub(crate) strict: bool,
    pub(crate) parallel: Option<usize>,
}

impl RunOverrides {
    /// Applies the overrides on top of `config`.
    pub(crate) fn apply(self, config: &mut PipelineConfig) -> Result<()> {
        if let Some(dir) = self.input_dir {
            config.input_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.snapshot.dir = dir;
        }
        if let Some(format) = self.format {
            config.snapshot.format = format.output_format();
        }
        if let Some(ext) = self.extension {
            config.extension = ext;
        }
        if let Some(interval) = self.interval.as_deref() {
            config.schedule.interval_minutes = parse_interval(interval)?.minutes();
        }
        if let Some(path) = self.store {
            config.store.path = Some(path);
        }
        if self.no_store {
            config.store.enabled = false;
        }
        if self.no_snapshot {
            config.snapshot.enabled = false;
        }
        if self.strict {
            config.validation = ValidationMode::Strict;
        }
        if let Some(parallel) = self.parallel {
            config.parallel_files = parallel;
        }
        Ok(())
    }
}

/// Process every matching file in the input directory.
pub(crate) async fn run(
    mut config: PipelineConfig,
    overrides: RunOverrides,
    quiet: bool,
) -> Result<()> {
    overrides.apply(&mut config)?;
    config.validate().context("Invalid configuration")?;

    let files = scan_input_dir(&config.input_dir, &config.extension)?;
    if files.is_empty() {
        if !quiet {
            println!(
                "No .{} files found in {}",
                config.extension.trim_start_matches('.'),
                config.input_dir.display()
            );
        }
        return Ok(());
    }

    let pipeline = Pipeline::from_config(&config)?;
    info!(files = files.len(), pipeline = ?pipeline, "starting run");

    // Stop scheduling new files on Ctrl-C; files in flight finish.
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("=>-"),
        );
        pb
    };

    let report = pipeline
        .run_batch(files, cancel, |outcome| {
            if let Some(name) = outcome.path.file_name() {
                progress.set_message(name.to_string_lossy().into_owned());
            }
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();

    if !quiet {
        println!("\nRun complete:");
        println!("  Files processed: {}", report.succeeded());
        println!("  Bars written: {}", report.total_bars());
        for outcome in &report.outcomes {
            if let Ok(file) = &outcome.result {
                println!(
                    "    {}: {} bars ({} records, {} skipped)",
                    file.key, file.bars, file.stats.records, file.stats.skipped
                );
            }
        }
        if report.failed() > 0 {
            println!("  Failed: {}", report.failed());
            for (i, (path, err)) in report.failures().enumerate() {
                println!("    {}: {}: {}", i + 1, path.display(), err);
            }
        }
        if report.cancelled() > 0 {
            println!("  Not started (cancelled): {}", report.cancelled());
        }
        if config.snapshot.enabled {
            println!("  Snapshots: {}", config.snapshot.dir.display());
        }
        if config.store.enabled {
            println!("  Store: {}", config.store.resolved_path().display());
        }
    }

    if report.failed() > 0 {
        bail!(
            "{} out of {} files failed",
            report.failed(),
            report.outcomes.len()
        );
    }
    if report.cancelled() > 0 {
        bail!("Run cancelled with {} files not started", report.cancelled());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let mut config = PipelineConfig::default();
        let overrides = RunOverrides {
            input_dir: Some(PathBuf::from("in")),
            format: Some(Format::Csv),
            interval: Some("30m".to_string()),
            no_store: true,
            strict: true,
            parallel: Some(2),
            ..RunOverrides::default()
        };
        overrides.apply(&mut config).unwrap();

        assert_eq!(config.input_dir, PathBuf::from("in"));
        assert_eq!(config.snapshot.format, OutputFormat::Csv);
        assert_eq!(config.schedule.interval_minutes, 30);
        assert!(!config.store.enabled);
        assert!(config.snapshot.enabled);
        assert_eq!(config.validation, ValidationMode::Strict);
        assert_eq!(config.parallel_files, 2);
    }

    #[test]
    fn test_overrides_reject_bad_interval() {
        let mut config = PipelineConfig::default();
        let overrides = RunOverrides {
            interval: Some("7m".to_string()),
            ..RunOverrides::default()
        };
        assert!(overrides.apply(&mut config).is_err());
    }

    #[tokio::test]
    async fn test_run_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = RunOverrides {
            input_dir: Some(dir.path().to_path_buf()),
            no_store: true,
            ..RunOverrides::default()
        };
        run(PipelineConfig::default(), overrides, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_run_writes_snapshots_and_store() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("1m");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(
            input.join("FG705_1m.csv"),
            "20161010,0.0900,100,105,99,101\n20161010,0.0914,101,103,100,102\n",
        )
        .unwrap();

        let store_path = dir.path().join("bars.db");
        let overrides = RunOverrides {
            input_dir: Some(input),
            output_dir: Some(dir.path().join("15m")),
            store: Some(store_path.clone()),
            ..RunOverrides::default()
        };
        run(PipelineConfig::default(), overrides, true).await.unwrap();

        assert!(dir.path().join("15m").join("FG705_15m.json").exists());
        let store = SqliteStore::open(&store_path).unwrap();
        assert_eq!(store.count("FG705_15m").unwrap(), 1);
    }
}
