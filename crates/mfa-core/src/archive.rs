//! Archive run: table → jobs → bounded workers → report.
//!
//! The coordinator reads the table and submits jobs; submission waits while
//! every worker is busy. Per-job failures end up in the report. Only a broken
//! table source, an unusable output directory, or an unwritable report fail
//! the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::ArchiverConfig;
use crate::error::ArchiveError;
use crate::executor::{ExecutorSettings, JobExecutor, Outcome, OutcomeStatus};
use crate::naming::NamingAllocator;
use crate::pool::WorkerPool;
use crate::report::{ResultAggregator, RunReport};
use crate::table::{JobPlanner, PlannedRow, TableSource};

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: RunReport,
    /// Records read from the table, header included.
    pub rows_read: u64,
    /// Data rows that yielded no jobs.
    pub rows_skipped: u64,
    pub jobs_submitted: usize,
    pub report_path: PathBuf,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.report.count(OutcomeStatus::Completed)
    }

    /// Jobs that did not complete; not retried by this run.
    pub fn failed(&self) -> Vec<&Outcome> {
        self.report.failed()
    }
}

/// Create the output directory if missing. Failure is fatal before any job starts.
pub fn prepare_output_dir(path: &Path) -> Result<(), ArchiveError> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o775);
    }
    builder
        .create(path)
        .map_err(|source| ArchiveError::OutputDir {
            path: path.to_path_buf(),
            source,
        })
}

/// Read the next productive row off the runtime; the planner does blocking file/csv I/O.
async fn next_planned(
    mut planner: JobPlanner,
    locator: &str,
) -> Result<(JobPlanner, Option<Result<PlannedRow, ArchiveError>>), ArchiveError> {
    tokio::task::spawn_blocking(move || {
        let next = planner.next();
        (planner, next)
    })
    .await
    .map_err(|e| ArchiveError::transport(locator, format!("row read task join: {}", e)))
}

/// Run every job in the configured table and write the report.
///
/// If `progress_tx` is `Some`, each outcome is also sent there as it happens.
pub async fn run_archive(
    cfg: &ArchiverConfig,
    progress_tx: Option<mpsc::Sender<Outcome>>,
) -> Result<RunSummary, ArchiveError> {
    cfg.validate()?;
    prepare_output_dir(&cfg.output_dir)?;

    let source = cfg.source.clone();
    let rows = tokio::task::spawn_blocking(move || TableSource::open(&source))
        .await
        .map_err(|e| ArchiveError::transport(&cfg.source, format!("open task join: {}", e)))??;
    let mut planner = JobPlanner::new(rows, cfg.max_rows);

    let results = Arc::new(ResultAggregator::new());
    let executor = Arc::new(JobExecutor::new(
        ExecutorSettings::from_config(cfg),
        Arc::new(NamingAllocator::new()),
        Arc::clone(&results),
        progress_tx,
    ));
    let mut pool = WorkerPool::new(cfg.concurrency);
    tracing::info!(
        concurrency = pool.capacity(),
        timeout_secs = cfg.timeout_secs,
        max_rows = cfg.max_rows,
        "archive run started"
    );

    let mut jobs_submitted = 0usize;
    let mut rows_read = 0u64;
    let mut rows_skipped = 0u64;
    let mut fatal = None;
    loop {
        let (back, next) = match next_planned(planner, &cfg.source).await {
            Ok(pair) => pair,
            Err(e) => {
                fatal = Some(e);
                break;
            }
        };
        planner = back;
        rows_read = planner.rows_read();
        rows_skipped = planner.rows_skipped();
        let planned = match next {
            None => break,
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                fatal = Some(e);
                break;
            }
        };
        tracing::debug!(row = planned.index, jobs = planned.jobs.len(), "queueing row");
        for job in planned.jobs {
            let executor = Arc::clone(&executor);
            pool.submit(async move {
                executor.execute(job).await;
            })
            .await;
            jobs_submitted += 1;
        }
    }

    // In-flight jobs finish (or time out) even when the source broke.
    pool.drain().await;
    drop(executor);
    if let Some(e) = fatal {
        tracing::error!("table source failed: {}", e);
        return Err(e);
    }

    // Every worker has returned, so this is the last reference; clone out otherwise.
    let report = match Arc::try_unwrap(results) {
        Ok(agg) => agg.into_report(),
        Err(arc) => arc.snapshot(),
    };

    report.persist(&cfg.report_path)?;
    if let Some(retry_path) = &cfg.retry_path {
        report.persist_failed(retry_path)?;
    }

    let summary = RunSummary {
        rows_read,
        rows_skipped,
        jobs_submitted,
        report_path: cfg.report_path.clone(),
        report,
    };
    tracing::info!(
        rows = summary.rows_read,
        jobs = summary.jobs_submitted,
        completed = summary.completed(),
        failed = summary.failed().len(),
        "archive run finished"
    );
    Ok(summary)
}
