//! CLI for the MFA batch media fetch archiver.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use mfa_core::config::{self, ArchiverConfig};
use std::path::PathBuf;

use commands::{run_archive, run_jobs, run_report};

/// Top-level CLI for the media fetch archiver.
#[derive(Debug, Parser)]
#[command(name = "mfa")]
#[command(about = "MFA: fetch every media link in a table with bounded concurrency", long_about = None)]
pub struct Cli {
    /// Append logs to this file instead of ~/.local/state/mfa/mfa.log.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch every link in the table and write the name mapping.
    Archive {
        /// Table URL or local CSV path (default from config).
        #[arg(long)]
        source: Option<String>,
        /// Directory to save fetched media to.
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
        /// Run up to N fetches at once.
        #[arg(long, value_name = "N")]
        concurrency: Option<usize>,
        /// Kill a fetch after this many seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Stop after reading N table records, header included (0 = all).
        #[arg(long, value_name = "N")]
        max: Option<usize>,
        /// Where to write the name/link/count mapping.
        #[arg(long, value_name = "PATH")]
        report: Option<PathBuf>,
        /// Also write jobs that did not complete to this file.
        #[arg(long, value_name = "PATH")]
        retry_out: Option<PathBuf>,
        /// Fetch tool to invoke (e.g. youtube-dl, yt-dlp).
        #[arg(long, value_name = "PROGRAM")]
        fetcher: Option<String>,
    },

    /// List the jobs a table would produce without fetching anything.
    Jobs {
        /// Table URL or local CSV path (default from config).
        #[arg(long)]
        source: Option<String>,
        /// Stop after reading N table records, header included (0 = all).
        #[arg(long, value_name = "N")]
        max: Option<usize>,
    },

    /// Summarize a name mapping written by a previous run.
    Report {
        /// Path to the mapping file.
        path: PathBuf,
    },
}

/// Per-run overrides of config.toml values.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub source: Option<String>,
    pub dir: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub timeout: Option<u64>,
    pub max: Option<usize>,
    pub report: Option<PathBuf>,
    pub retry_out: Option<PathBuf>,
    pub fetcher: Option<String>,
}

impl Overrides {
    pub(crate) fn apply(self, cfg: &mut ArchiverConfig) {
        if let Some(v) = self.source {
            cfg.source = v;
        }
        if let Some(v) = self.dir {
            cfg.output_dir = v;
        }
        if let Some(v) = self.concurrency {
            cfg.concurrency = v;
        }
        if let Some(v) = self.timeout {
            cfg.timeout_secs = v;
        }
        if let Some(v) = self.max {
            cfg.max_rows = v;
        }
        if let Some(v) = self.report {
            cfg.report_path = v;
        }
        if let Some(v) = self.retry_out {
            cfg.retry_path = Some(v);
        }
        if let Some(v) = self.fetcher {
            cfg.fetcher.program = v;
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            CliCommand::Archive {
                source,
                dir,
                concurrency,
                timeout,
                max,
                report,
                retry_out,
                fetcher,
            } => {
                let mut cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                Overrides {
                    source,
                    dir,
                    concurrency,
                    timeout,
                    max,
                    report,
                    retry_out,
                    fetcher,
                }
                .apply(&mut cfg);
                run_archive(&cfg).await?;
            }
            CliCommand::Jobs { source, max } => {
                let mut cfg = config::load_or_init()?;
                Overrides {
                    source,
                    max,
                    ..Overrides::default()
                }
                .apply(&mut cfg);
                run_jobs(&cfg).await?;
            }
            CliCommand::Report { path } => run_report(&path)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
