//! `mfa report` – summarize a name mapping from a previous run.

use anyhow::{Context, Result};
use mfa_core::report::parse_line;
use std::collections::HashSet;
use std::path::Path;

pub fn run_report(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read report {}", path.display()))?;

    let mut entries = 0usize;
    let mut malformed = 0usize;
    let mut names = HashSet::new();
    for line in text.lines().filter(|l| !l.is_empty()) {
        match parse_line(line) {
            Some(entry) => {
                println!("{:<6} {}\t{}", entry.token, entry.label, entry.link);
                names.insert(entry.label);
                entries += 1;
            }
            None => malformed += 1,
        }
    }
    println!("{} entries for {} name(s)", entries, names.len());
    if malformed > 0 {
        println!("{} malformed line(s) skipped", malformed);
    }
    Ok(())
}
