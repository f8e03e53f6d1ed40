//! Bounded-concurrency batch media fetch engine.
//!
//! Reads a job table, fans each target URI out to a fixed-size pool of
//! workers running an external fetch tool under a timeout, and writes a
//! name/link/token mapping once the run ends.

pub mod config;
pub mod error;
pub mod logging;

pub mod archive;
pub mod executor;
pub mod naming;
pub mod pool;
pub mod report;
pub mod table;

pub use archive::{run_archive, RunSummary};
pub use error::ArchiveError;
