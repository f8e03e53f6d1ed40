//! `mfa archive` – fetch every link in the table.

use anyhow::Result;
use mfa_core::archive;
use mfa_core::config::ArchiverConfig;
use mfa_core::executor::Outcome;

pub async fn run_archive(cfg: &ArchiverConfig) -> Result<()> {
    println!(
        "archiving {} into {} ({} at a time, {}s timeout)",
        cfg.source,
        cfg.output_dir.display(),
        cfg.concurrency,
        cfg.timeout_secs
    );

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<Outcome>(64);
    let progress_handle = tokio::spawn(async move {
        while let Some(o) = progress_rx.recv().await {
            println!(
                "  {:<12} #{:<6} {}  {}",
                o.status.as_str(),
                o.token,
                o.job.label,
                o.job.target_uri
            );
        }
    });

    let result = archive::run_archive(cfg, Some(progress_tx)).await;
    let _ = progress_handle.await;
    let summary = result?;

    println!(
        "{} job(s) from {} row(s): {} completed, {} failed; mapping written to {}",
        summary.jobs_submitted,
        summary.rows_read,
        summary.completed(),
        summary.failed().len(),
        summary.report_path.display()
    );
    if let Some(path) = &cfg.retry_path {
        println!("jobs to retry written to {}", path.display());
    }
    Ok(())
}
