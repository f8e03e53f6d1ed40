//! Bounded capture of a subprocess's stderr.

use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::ChildStderr;
use tokio::task::JoinHandle;

/// Bytes of diagnostic output kept per job (the tail is kept).
pub(super) const CAPTURE_LIMIT: usize = 64 * 1024;

/// Background reader draining a child's stderr into a bounded buffer.
pub(super) struct StderrCapture {
    handle: JoinHandle<Vec<u8>>,
}

impl StderrCapture {
    pub(super) fn spawn(mut stderr: ChildStderr) -> Self {
        let handle = tokio::spawn(async move {
            let mut kept = Vec::new();
            let mut buf = [0u8; 8192];
            loop {
                match stderr.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        kept.extend_from_slice(&buf[..n]);
                        if kept.len() > CAPTURE_LIMIT {
                            let excess = kept.len() - CAPTURE_LIMIT;
                            kept.drain(..excess);
                        }
                    }
                }
            }
            kept
        });
        Self { handle }
    }

    /// Collect what was captured. Waits at most `grace` for the pipe to close;
    /// a descendant still holding it open does not block the caller.
    pub(super) async fn finish(self, grace: Duration) -> String {
        let mut handle = self.handle;
        match tokio::time::timeout(grace, &mut handle).await {
            Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).trim_end().to_string(),
            Ok(Err(_)) => String::new(),
            Err(_) => {
                handle.abort();
                String::new()
            }
        }
    }
}
