//! Run-level errors. Per-job failures are outcomes, not errors.

use std::path::PathBuf;

/// Failure that aborts (or fails) an entire archive run.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The job table could not be retrieved, or its byte stream broke mid-read.
    #[error("table source {locator}: {detail}")]
    Transport { locator: String, detail: String },

    /// The output directory could not be created before the run started.
    #[error("create output dir {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The final report could not be persisted. Fetches already done are kept.
    #[error("write report {}: {source}", .path.display())]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ArchiveError {
    pub(crate) fn transport(locator: &str, detail: impl std::fmt::Display) -> Self {
        ArchiveError::Transport {
            locator: locator.to_string(),
            detail: detail.to_string(),
        }
    }

    /// True for failures of the job table itself (unreachable or corrupted stream).
    pub fn is_transport(&self) -> bool {
        matches!(self, ArchiveError::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_display_names_locator() {
        let e = ArchiveError::transport("https://example.com/t.csv", "HTTP 404");
        assert!(e.is_transport());
        assert_eq!(e.to_string(), "table source https://example.com/t.csv: HTTP 404");
    }

    #[test]
    fn report_write_display_includes_path() {
        let e = ArchiveError::ReportWrite {
            path: PathBuf::from("/nope/name_mapping.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(!e.is_transport());
        assert!(e.to_string().contains("/nope/name_mapping.txt"));
    }
}
