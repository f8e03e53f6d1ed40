//! Outcome aggregation and the persisted name mapping.
//!
//! Workers append outcomes concurrently while a run is in progress; once every
//! worker has returned, the aggregator is frozen into a [`RunReport`] and
//! written out once. Each line maps a job to the token in its artifact name:
//!
//! ```text
//! name: <label>\tlink: <target uri>\tcount: <token>
//! ```

use std::fs;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::error::ArchiveError;
use crate::executor::{Outcome, OutcomeStatus};
use crate::naming::NameToken;

/// Thread-safe, append-only collection of outcomes in completion order.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    outcomes: Mutex<Vec<Outcome>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: Outcome) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> RunReport {
        RunReport {
            outcomes: self
                .outcomes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    /// Freeze into a report. Call only after all workers have returned.
    pub fn into_report(self) -> RunReport {
        RunReport {
            outcomes: self
                .outcomes
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }
}

/// Frozen outcomes of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    outcomes: Vec<Outcome>,
}

impl RunReport {
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Jobs that did not complete, kept for a later run to reprocess.
    pub fn failed(&self) -> Vec<&Outcome> {
        self.outcomes
            .iter()
            .filter(|o| !o.status.is_success())
            .collect()
    }

    /// Mapping text, one line per outcome.
    pub fn render(&self) -> String {
        render_lines(self.outcomes.iter())
    }

    /// Write the mapping to `path`, replacing any previous file.
    pub fn persist(&self, path: &Path) -> Result<(), ArchiveError> {
        write_report(path, &self.render())
    }

    /// Write only non-completed jobs to `path`, in the same line format.
    pub fn persist_failed(&self, path: &Path) -> Result<(), ArchiveError> {
        let text = render_lines(self.outcomes.iter().filter(|o| !o.status.is_success()));
        write_report(path, &text)
    }
}

fn render_lines<'a>(outcomes: impl Iterator<Item = &'a Outcome>) -> String {
    let mut out = String::new();
    for o in outcomes {
        out.push_str(&format_line(&o.job.label, &o.job.target_uri, o.token));
    }
    out
}

fn write_report(path: &Path, text: &str) -> Result<(), ArchiveError> {
    fs::write(path, text).map_err(|source| ArchiveError::ReportWrite {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = text.len(), "wrote report");
    Ok(())
}

/// One report line, newline included.
pub fn format_line(label: &str, link: &str, token: NameToken) -> String {
    format!("name: {}\tlink: {}\tcount: {}\n", label, link, token)
}

/// A line read back from an existing report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub label: String,
    pub link: String,
    pub token: NameToken,
}

/// Parse one report line (trailing newline optional). `None` if malformed.
pub fn parse_line(line: &str) -> Option<ReportEntry> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let mut fields = line.splitn(3, '\t');
    let label = fields.next()?.strip_prefix("name: ")?;
    let link = fields.next()?.strip_prefix("link: ")?;
    let token = fields.next()?.strip_prefix("count: ")?.trim().parse().ok()?;
    Some(ReportEntry {
        label: label.to_string(),
        link: link.to_string(),
        token,
    })
}
