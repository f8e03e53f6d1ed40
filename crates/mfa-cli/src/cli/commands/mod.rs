//! CLI command handlers, one per file.

mod archive;
mod jobs;
mod report;

pub use archive::run_archive;
pub use jobs::run_jobs;
pub use report::run_report;
