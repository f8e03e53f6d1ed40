//! Job table: retrieval, lazy record parsing, and row-to-job conversion.
//!
//! Column layout of the incident table:
//!
//! ```text
//! 0     , 1      , 2   , 3   , 4   , 5        , 6     , 7     , ...
//! state , edit_at, city, name, date, date_text, Link 1, Link 2, ...
//! ```

mod rows;
mod source;
mod transport;

pub use rows::{jobs_from_row, JobPlanner, PlannedRow};
pub use source::{RowStream, TableSource};
pub use transport::Locator;

/// Column holding the human-readable entity name.
pub const LABEL_COLUMN: usize = 3;
/// First column that may hold a target URI; earlier columns are metadata.
pub const FIRST_TARGET_COLUMN: usize = 6;

/// One record of the table, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Zero-based record index (0 is the header).
    pub index: u64,
    pub cells: Vec<String>,
}

impl Row {
    pub fn new(index: u64, cells: Vec<String>) -> Self {
        Self { index, cells }
    }

    pub fn is_header(&self) -> bool {
        self.index == 0
    }
}

/// One fetch to perform: an entity label and a single target URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Job {
    pub label: String,
    pub target_uri: String,
}

impl Job {
    pub fn new(label: impl Into<String>, target_uri: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target_uri: target_uri.into(),
        }
    }
}
