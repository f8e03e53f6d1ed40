//! Stand-in for the external fetch tool, driven by the target URI.
//!
//! Invoked as `sh <script> -o <template> <uri>`:
//! - `sleep:N`   sleeps N seconds, then succeeds
//! - `pid:PATH`  writes its pid to PATH and hangs (until killed)
//! - `fail...`   prints a diagnostic to stderr and exits 1
//! - anything else creates the templated output file and succeeds

use std::path::{Path, PathBuf};

use mfa_core::config::{ArchiverConfig, FetcherConfig};

const SCRIPT: &str = r#"
template="$2"
uri="$3"
case "$uri" in
  sleep:*) sleep "${uri#sleep:}" ;;
  pid:*) echo $$ > "${uri#pid:}"; exec sleep 30 ;;
  fail*) echo "ERROR: unsupported URL: $uri" >&2; exit 1 ;;
esac
out=$(printf '%s' "$template" | sed -e 's/%(id)s/clip/' -e 's/%(ext)s/mp4/')
: > "$out"
"#;

/// Write the script into `dir` and return its path.
pub fn install(dir: &Path) -> PathBuf {
    let path = dir.join("fake-fetch.sh");
    std::fs::write(&path, SCRIPT).expect("write fake fetcher");
    path
}

/// Config running the fake fetcher against a table at `table`, writing under `work`.
pub fn config(work: &Path, table: &Path) -> ArchiverConfig {
    let script = install(work);
    ArchiverConfig {
        source: table.to_string_lossy().into_owned(),
        output_dir: work.join("videos"),
        report_path: work.join("name_mapping.txt"),
        concurrency: 2,
        timeout_secs: 30,
        max_rows: 0,
        retry_path: None,
        fetcher: FetcherConfig {
            program: "sh".to_string(),
            extra_args: vec![script.to_string_lossy().into_owned()],
        },
    }
}

/// Header plus one row per `(label, targets)`; targets fill columns 6 onward.
pub fn write_table(dir: &Path, rows: &[(&str, &[&str])]) -> PathBuf {
    let mut text =
        String::from("state,edit_at,city,name,date,date_text,Link 1,Link 2,Link 3\n");
    for (label, targets) in rows {
        text.push_str(&format!("OR,2020-06-01,Portland,{},2020-05-31,May 31", label));
        for t in targets.iter() {
            text.push(',');
            text.push_str(t);
        }
        text.push('\n');
    }
    let path = dir.join("table.csv");
    std::fs::write(&path, text).expect("write table");
    path
}
