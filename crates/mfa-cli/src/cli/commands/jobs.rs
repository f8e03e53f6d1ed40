//! `mfa jobs` – list the jobs a table would produce.

use anyhow::{Context, Result};
use mfa_core::config::ArchiverConfig;
use mfa_core::table::{JobPlanner, TableSource};

pub async fn run_jobs(cfg: &ArchiverConfig) -> Result<()> {
    let source = cfg.source.clone();
    let rows = tokio::task::spawn_blocking(move || TableSource::open(&source))
        .await
        .context("open task join")??;

    let mut planner = JobPlanner::new(rows, cfg.max_rows);
    let mut total = 0usize;
    for planned in planner.by_ref() {
        let planned = planned?;
        for job in planned.jobs {
            println!("{:<6} {}\t{}", planned.index, job.label, job.target_uri);
            total += 1;
        }
    }
    println!(
        "{} job(s) from {} row(s), {} row(s) without links",
        total,
        planner.rows_read(),
        planner.rows_skipped()
    );
    Ok(())
}
