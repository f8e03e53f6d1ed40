use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ArchiveError;

/// Table published by the 2020PB data build; one row per incident.
pub const DEFAULT_SOURCE: &str =
    "https://raw.githubusercontent.com/2020PB/police-brutality/data_build/all-locations.csv";

/// External fetch tool settings (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Executable invoked once per job.
    pub program: String,
    /// Fixed arguments placed before `-o <template> <uri>`.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            program: "youtube-dl".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Global configuration loaded from `~/.config/mfa/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiverConfig {
    /// Job table locator: an http(s) URL or a local file path.
    pub source: String,
    /// Directory the fetch tool writes artifacts into. Created at startup.
    pub output_dir: PathBuf,
    /// Where the name/link/count mapping is written at run end.
    pub report_path: PathBuf,
    /// Maximum number of fetch subprocesses in flight at once.
    pub concurrency: usize,
    /// Per-job wall-clock limit in seconds.
    pub timeout_secs: u64,
    /// Maximum number of table records to read, header included (0 = unbounded).
    #[serde(default)]
    pub max_rows: usize,
    /// Optional file receiving every non-completed job in report format.
    #[serde(default)]
    pub retry_path: Option<PathBuf>,
    #[serde(default)]
    pub fetcher: FetcherConfig,
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            output_dir: PathBuf::from("videos"),
            report_path: PathBuf::from("name_mapping.txt"),
            concurrency: 4,
            timeout_secs: 180,
            max_rows: 0,
            retry_path: None,
            fetcher: FetcherConfig::default(),
        }
    }
}

impl ArchiverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> std::result::Result<(), ArchiveError> {
        if self.concurrency == 0 {
            return Err(ArchiveError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ArchiveError::Config(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.fetcher.program.trim().is_empty() {
            return Err(ArchiveError::Config(
                "fetcher program must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("mfa")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ArchiverConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ArchiverConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ArchiverConfig = toml::from_str(&data)?;
    Ok(cfg)
}
