//! Row-to-job conversion with header skip and an optional record cap.

use super::source::RowStream;
use super::{Job, Row, FIRST_TARGET_COLUMN, LABEL_COLUMN};
use crate::error::ArchiveError;

/// Jobs for one table row. Rows too short to reach the first target column
/// yield nothing; empty target cells are skipped. Cells are used verbatim.
pub fn jobs_from_row(row: &Row) -> Vec<Job> {
    if row.cells.len() <= FIRST_TARGET_COLUMN {
        return Vec::new();
    }
    let label = &row.cells[LABEL_COLUMN];
    row.cells[FIRST_TARGET_COLUMN..]
        .iter()
        .filter(|c| !c.is_empty())
        .map(|target| Job::new(label.clone(), target.as_str()))
        .collect()
}

/// Jobs produced by one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRow {
    pub index: u64,
    pub jobs: Vec<Job>,
}

/// Drives a `RowStream`, yielding only rows that produce at least one job.
///
/// `max_rows` caps the number of records read from the source, header
/// included; 0 means unbounded.
pub struct JobPlanner {
    rows: RowStream,
    max_rows: usize,
    skipped: u64,
}

impl JobPlanner {
    pub fn new(rows: RowStream, max_rows: usize) -> Self {
        Self {
            rows,
            max_rows,
            skipped: 0,
        }
    }

    /// Records read from the source so far (header included).
    pub fn rows_read(&self) -> u64 {
        self.rows.rows_read()
    }

    /// Data rows that produced no jobs (short or all targets blank).
    pub fn rows_skipped(&self) -> u64 {
        self.skipped
    }

    fn cap_reached(&self) -> bool {
        self.max_rows != 0 && self.rows.rows_read() >= self.max_rows as u64
    }
}

impl Iterator for JobPlanner {
    type Item = Result<PlannedRow, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cap_reached() {
                tracing::info!(max_rows = self.max_rows, "row cap reached");
                return None;
            }
            let row = match self.rows.next()? {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            };
            if row.is_header() {
                continue;
            }
            let jobs = jobs_from_row(&row);
            if jobs.is_empty() {
                self.skipped += 1;
                tracing::debug!(row = row.index, cells = row.cells.len(), "row has no targets");
                continue;
            }
            return Some(Ok(PlannedRow {
                index: row.index,
                jobs,
            }));
        }
    }
}
