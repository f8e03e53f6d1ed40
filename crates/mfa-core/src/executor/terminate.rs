//! Forced termination of a fetch subprocess that overran its timeout.

use tokio::process::Child;

/// Kill `child` (and, on Unix, its process group) and reap it.
///
/// The child may exit on its own between the timer firing and the kill; a
/// process that is already gone is not an error.
pub(super) async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Some(pid) = child.id() {
            kill_group(pid);
        }
    }

    if let Err(e) = child.start_kill() {
        tracing::debug!("kill after timeout: {}", e);
    }
    match child.wait().await {
        Ok(status) => tracing::debug!(%status, "timed-out fetch reaped"),
        Err(e) => tracing::warn!("reap timed-out fetch: {}", e),
    }
}

/// SIGKILL the process group led by `pid`. ESRCH means it already exited.
#[cfg(unix)]
fn kill_group(pid: u32) {
    let Ok(pgid) = libc::pid_t::try_from(pid) else {
        return;
    };
    let r = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if r != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            tracing::debug!(pgid, "killpg: {}", err);
        }
    }
}
