//! Graceful subprocess termination.

use std::time::Duration;

use tokio::process::Child;
use tokio::time::timeout;

/// How long a child gets to exit after the polite signal.
const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Terminate a child process: SIGTERM first, SIGKILL after the grace
/// period. On non-Unix platforms the kill is immediate.
///
/// Always ends with a `wait` so the child is reaped.
pub async fn shutdown_child(child: &mut Child) -> std::io::Result<std::process::ExitStatus> {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        if let Some(raw_pid) = child.id() {
            #[allow(clippy::cast_possible_wrap)]
            let pid = Pid::from_raw(raw_pid as i32);
            match kill(pid, Signal::SIGTERM) {
                // ESRCH: already gone, fall through to wait.
                Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
                Err(err) => {
                    tracing::warn!(%pid, error = %err, "SIGTERM failed, killing instead");
                }
            }

            if let Ok(status) = timeout(GRACE_PERIOD, child.wait()).await {
                return status;
            }
            tracing::warn!(%pid, "child ignored SIGTERM, escalating to SIGKILL");
        }
    }

    child.kill().await?;
    child.wait().await
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tokio::process::Command;

    #[tokio::test]
    async fn terminates_a_sleeping_child() {
        let mut child = Command::new("sleep")
            .arg("30")
            .kill_on_drop(true)
            .spawn()
            .unwrap();

        let started = std::time::Instant::now();
        let status = shutdown_child(&mut child).await.unwrap();
        assert!(!status.success());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn reaps_a_child_that_already_exited() {
        let mut child = Command::new("true").spawn().unwrap();
        // Give it a moment to exit on its own.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let status = shutdown_child(&mut child).await.unwrap();
        assert!(status.success());
    }
}
