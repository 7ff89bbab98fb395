//! Concurrent batch processing.

use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

use crate::{FileReport, Pipeline, PipelineError};

/// Shared flag used to stop a batch between files.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Files already started run to completion.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of processing one file within a batch.
#[derive(Debug)]
pub struct FileOutcome {
    /// The source file.
    pub path: PathBuf,
    /// The report, or why the file failed.
    pub result: Result<FileReport, PipelineError>,
}

impl FileOutcome {
    /// Returns whether the file was skipped because of cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.result, Err(PipelineError::Cancelled))
    }
}

/// Outcome of a whole batch, ordered by file path.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per input file.
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Number of files processed successfully.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of files that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err() && !o.is_cancelled())
            .count()
    }

    /// Number of files not started because of cancellation.
    #[must_use]
    pub fn cancelled(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_cancelled()).count()
    }

    /// Total bars written across successful files.
    #[must_use]
    pub fn total_bars(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|r| r.bars)
            .sum()
    }

    /// Iterates over the failed files and their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&PathBuf, &PipelineError)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Err(PipelineError::Cancelled) | Ok(_) => None,
            Err(e) => Some((&o.path, e)),
        })
    }
}

impl Pipeline {
    /// Processes `files` concurrently on the blocking thread pool.
    ///
    /// At most [`Pipeline::parallelism`] files are in flight. `on_file` is
    /// called as each file finishes, in completion order. A failing file is
    /// recorded and never stops the batch; once `cancel` is set, files that
    /// have not started are reported as [`PipelineError::Cancelled`].
    pub async fn run_batch<F>(&self, files: Vec<PathBuf>, cancel: CancelFlag, mut on_file: F) -> BatchReport
    where
        F: FnMut(&FileOutcome),
    {
        debug!(files = files.len(), parallel = self.parallelism(), "starting batch");

        let mut outcomes = stream::iter(files)
            .map(|path| {
                let pipeline = self.clone();
                let cancel = cancel.clone();
                async move {
                    if cancel.is_cancelled() {
                        return FileOutcome {
                            path,
                            result: Err(PipelineError::Cancelled),
                        };
                    }
                    let task_path = path.clone();
                    let result = tokio::task::spawn_blocking(move || pipeline.process_file(&task_path))
                        .await
                        .unwrap_or_else(|e| Err(PipelineError::Task(e.to_string())));
                    FileOutcome { path, result }
                }
            })
            .buffer_unordered(self.parallelism())
            .inspect(|outcome| {
                match &outcome.result {
                    Err(PipelineError::Cancelled) | Ok(_) => {}
                    Err(e) => warn!(file = %outcome.path.display(), error = %e, "file failed"),
                }
                on_file(outcome);
            })
            .collect::<Vec<_>>()
            .await;

        outcomes.sort_by(|a, b| a.path.cmp(&b.path));
        BatchReport { outcomes }
    }
}
