//! Job execution: one external fetch per job, raced against a timeout.
//!
//! Every call to [`JobExecutor::execute`] allocates a name token, launches the
//! fetch tool, and ends in exactly one [`Outcome`], which is recorded in the
//! shared [`ResultAggregator`] before the call returns:
//!
//! `Pending -> Running -> {Completed | StartFailed | RunFailed | TimedOut}`

mod capture;
mod template;
mod terminate;

pub use template::output_template;

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::sync::mpsc;

use crate::config::{ArchiverConfig, FetcherConfig};
use crate::naming::{NameToken, NamingAllocator};
use crate::report::ResultAggregator;
use crate::table::Job;

use capture::StderrCapture;

/// How long to wait for stderr to close after the process has ended.
const CAPTURE_GRACE: Duration = Duration::from_secs(2);

/// Terminal state of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    Completed,
    /// The fetch tool could not be launched.
    StartFailed,
    /// The fetch tool ran and exited unsuccessfully.
    RunFailed,
    /// The fetch tool overran the timeout and was killed.
    TimedOut,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Completed => "completed",
            OutcomeStatus::StartFailed => "start-failed",
            OutcomeStatus::RunFailed => "run-failed",
            OutcomeStatus::TimedOut => "timed-out",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Completed)
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result record of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub job: Job,
    pub token: NameToken,
    pub status: OutcomeStatus,
    /// Captured stderr and the launch/exit error, when the job did not complete.
    pub error_detail: Option<String>,
    pub elapsed: Duration,
}

/// Settings shared by every job of a run.
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub fetcher: FetcherConfig,
    pub output_dir: PathBuf,
    pub timeout: Duration,
}

impl ExecutorSettings {
    pub fn from_config(cfg: &ArchiverConfig) -> Self {
        Self {
            fetcher: cfg.fetcher.clone(),
            output_dir: cfg.output_dir.clone(),
            timeout: cfg.timeout(),
        }
    }
}

/// Runs jobs inside pool workers. Cheap to share behind an `Arc`.
pub struct JobExecutor {
    settings: ExecutorSettings,
    naming: Arc<NamingAllocator>,
    results: Arc<ResultAggregator>,
    progress_tx: Option<mpsc::Sender<Outcome>>,
}

impl JobExecutor {
    pub fn new(
        settings: ExecutorSettings,
        naming: Arc<NamingAllocator>,
        results: Arc<ResultAggregator>,
        progress_tx: Option<mpsc::Sender<Outcome>>,
    ) -> Self {
        Self {
            settings,
            naming,
            results,
            progress_tx,
        }
    }

    /// Fetch one target. Always records and returns exactly one outcome.
    pub async fn execute(&self, job: Job) -> Outcome {
        let token = self.naming.next();
        let template = output_template(&self.settings.output_dir, token);
        tracing::info!(name = %job.label, url = %job.target_uri, token, "fetching");

        let started = Instant::now();
        let (status, error_detail) = self.run_fetch(&job, &template).await;
        let outcome = Outcome {
            job,
            token,
            status,
            error_detail,
            elapsed: started.elapsed(),
        };
        log_outcome(&outcome);

        self.results.record(outcome.clone());
        if let Some(tx) = &self.progress_tx {
            let _ = tx.send(outcome.clone()).await;
        }
        outcome
    }

    fn command(&self, template: &str, target: &str) -> Command {
        let fetcher = &self.settings.fetcher;
        let mut cmd = Command::new(&fetcher.program);
        cmd.args(&fetcher.extra_args)
            .arg("-o")
            .arg(template)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }

    async fn run_fetch(&self, job: &Job, template: &str) -> (OutcomeStatus, Option<String>) {
        let program = &self.settings.fetcher.program;
        let mut child = match self.command(template, &job.target_uri).spawn() {
            Ok(child) => child,
            Err(e) => {
                return (
                    OutcomeStatus::StartFailed,
                    Some(format!("start {}: {}", program, e)),
                );
            }
        };
        let capture = child.stderr.take().map(StderrCapture::spawn);

        tokio::select! {
            res = child.wait() => {
                let stderr = collect(capture).await;
                match res {
                    Ok(status) if status.success() => (OutcomeStatus::Completed, None),
                    Ok(status) => (OutcomeStatus::RunFailed, Some(detail(&status.to_string(), &stderr))),
                    Err(e) => (OutcomeStatus::RunFailed, Some(detail(&format!("wait: {}", e), &stderr))),
                }
            }
            _ = tokio::time::sleep(self.settings.timeout) => {
                terminate::terminate(&mut child).await;
                let stderr = collect(capture).await;
                let reason = format!("no completion within {:?}", self.settings.timeout);
                (OutcomeStatus::TimedOut, Some(detail(&reason, &stderr)))
            }
        }
    }
}

async fn collect(capture: Option<StderrCapture>) -> String {
    match capture {
        Some(c) => c.finish(CAPTURE_GRACE).await,
        None => String::new(),
    }
}

fn detail(error: &str, stderr: &str) -> String {
    if stderr.is_empty() {
        error.to_string()
    } else {
        format!("{}; stderr: {}", error, stderr)
    }
}

fn log_outcome(o: &Outcome) {
    let name = o.job.label.as_str();
    let url = o.job.target_uri.as_str();
    let elapsed_ms = o.elapsed.as_millis() as u64;
    let detail = o.error_detail.as_deref().unwrap_or("");
    match o.status {
        OutcomeStatus::Completed => {
            tracing::info!(name, url, token = o.token, elapsed_ms, "fetch completed")
        }
        OutcomeStatus::StartFailed => {
            tracing::warn!(name, url, token = o.token, error = detail, "failed to start fetch")
        }
        OutcomeStatus::RunFailed => {
            tracing::error!(name, url, token = o.token, error = detail, "fetch failed")
        }
        OutcomeStatus::TimedOut => {
            tracing::warn!(name, url, token = o.token, elapsed_ms, "fetch stalled, killed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor(program: &str, timeout: Duration) -> (JobExecutor, Arc<ResultAggregator>) {
        let results = Arc::new(ResultAggregator::new());
        let settings = ExecutorSettings {
            fetcher: FetcherConfig {
                program: program.to_string(),
                extra_args: Vec::new(),
            },
            output_dir: PathBuf::from("out"),
            timeout,
        };
        let exec = JobExecutor::new(
            settings,
            Arc::new(NamingAllocator::new()),
            Arc::clone(&results),
            None,
        );
        (exec, results)
    }

    #[test]
    fn detail_joins_error_and_stderr() {
        assert_eq!(detail("exit status: 1", ""), "exit status: 1");
        assert_eq!(
            detail("exit status: 1", "ERROR: unsupported URL"),
            "exit status: 1; stderr: ERROR: unsupported URL"
        );
    }

    #[test]
    fn status_labels() {
        assert_eq!(OutcomeStatus::TimedOut.to_string(), "timed-out");
        assert!(OutcomeStatus::Completed.is_success());
        assert!(!OutcomeStatus::RunFailed.is_success());
    }

    #[tokio::test]
    async fn missing_program_is_start_failed_and_recorded() {
        let (exec, results) = executor("/nonexistent/fetch-tool", Duration::from_secs(5));
        let outcome = exec.execute(Job::new("Name", "https://example.com/v")).await;
        assert_eq!(outcome.status, OutcomeStatus::StartFailed);
        assert_eq!(outcome.token, 1);
        assert!(outcome.error_detail.unwrap().contains("/nonexistent/fetch-tool"));
        assert_eq!(results.len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failed_start_still_consumes_token() {
        let (exec, results) = executor("/nonexistent/fetch-tool", Duration::from_secs(5));
        let a = exec.execute(Job::new("A", "u1")).await;
        let b = exec.execute(Job::new("B", "u2")).await;
        assert!(b.token > a.token);
        assert_eq!(results.len(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn false_exits_nonzero_as_run_failed() {
        let (exec, _) = executor("false", Duration::from_secs(5));
        let outcome = exec.execute(Job::new("Name", "u")).await;
        assert_eq!(outcome.status, OutcomeStatus::RunFailed);
        assert!(outcome.error_detail.unwrap().contains("exit status"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn true_exits_zero_as_completed() {
        let (exec, _) = executor("true", Duration::from_secs(5));
        let outcome = exec.execute(Job::new("Name", "u")).await;
        assert_eq!(outcome.status, OutcomeStatus::Completed);
        assert!(outcome.error_detail.is_none());
    }
}
