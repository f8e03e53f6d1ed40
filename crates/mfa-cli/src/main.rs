use clap::Parser;
use mfa_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Fall back to stderr when the log file cannot be opened.
    let logged = match cli.log_file.as_deref() {
        Some(path) => logging::init_logging_at(path),
        None => logging::init_logging(),
    };
    if let Err(err) = logged {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable: {:#}", err);
    }

    if let Err(err) = cli.run().await {
        eprintln!("mfa error: {:#}", err);
        std::process::exit(1);
    }
}
