//! Fetch command handler: one download, rendered in the terminal.
//!
//! The handler is just another subscriber of the job manager's event
//! channel; the progress bar consumes the same events the web UI would.

use anyhow::{Context, Result, bail};
use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use tokio::sync::broadcast::error::RecvError;

use steamfetch_core::events::JobEvent;
use steamfetch_core::job::{JobRequest, Login};
use steamfetch_runtime::{JobManager, steamcmd};

use crate::bootstrap::CliContext;

/// Environment variable holding the Steam account password, so scripts
/// can drive `fetch --username` without a terminal.
pub const ENV_PASSWORD: &str = "STEAMFETCH_PASSWORD";

/// Download one app and block until it finishes. Ctrl+C cancels the job
/// and terminates SteamCMD before the handler returns.
pub async fn execute(ctx: &CliContext, target: &str, login: Login) -> Result<()> {
    let info = steamcmd::ensure_installed(&ctx.layout, ctx.settings.steamcmd_path.as_deref())
        .await
        .context("SteamCMD is required for downloads")?;
    tracing::debug!(path = %info.path.display(), "using SteamCMD");

    let manager = JobManager::new(ctx.layout.clone(), ctx.settings.steamcmd_path.clone());
    let mut events = manager.subscribe();

    let job = manager
        .start(JobRequest {
            target: target.to_string(),
            login,
        })
        .await?;
    println!("Downloading app {} to {}", job.app_id, job.install_dir.display());

    let bar = progress_bar();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                bar.println("Cancelling...");
                manager.cancel()?;
            }
            event = events.recv() => match event {
                Ok(JobEvent::JobProgress { downloaded_bytes, total_bytes, speed_bps, .. }) => {
                    if total_bytes > 0 {
                        bar.set_length(total_bytes);
                    }
                    bar.set_position(downloaded_bytes);
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    bar.set_message(format!("{}/s", HumanBytes(speed_bps as u64)));
                }
                Ok(JobEvent::JobLog { line, .. }) => {
                    bar.println(line);
                }
                Ok(JobEvent::JobCompleted { install_dir, .. }) => {
                    bar.finish_and_clear();
                    println!("Download complete: {install_dir}");
                    return Ok(());
                }
                Ok(JobEvent::JobFailed { error, .. }) => {
                    bar.abandon();
                    bail!("download failed: {error}");
                }
                Ok(JobEvent::JobCancelled { .. }) => {
                    bar.abandon();
                    bail!("download cancelled");
                }
                Ok(JobEvent::JobStarted { .. }) => {}
                // Missed events only affect the display; resync from the store.
                Err(RecvError::Lagged(_)) => {
                    if let Some(job) = manager.current_job() {
                        if job.status.is_terminal() {
                            bar.finish_and_clear();
                            return finish_from_snapshot(&job);
                        }
                    }
                }
                Err(RecvError::Closed) => bail!("job event channel closed unexpectedly"),
            }
        }
    }
}

fn finish_from_snapshot(job: &steamfetch_core::job::DownloadJob) -> Result<()> {
    use steamfetch_core::job::JobStatus;
    match job.status {
        JobStatus::Succeeded => {
            println!("Download complete: {}", job.install_dir.display());
            Ok(())
        }
        JobStatus::Cancelled => bail!("download cancelled"),
        _ => bail!(
            "download failed: {}",
            job.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

/// Turn the fetch flags into a login, prompting for the password when it
/// is not supplied through [`ENV_PASSWORD`]. The prompt never echoes.
pub fn resolve_login(anonymous: bool, username: Option<String>) -> Result<Login> {
    if anonymous {
        return Ok(Login::Anonymous);
    }
    let Some(username) = username else {
        return Ok(Login::Anonymous);
    };

    let password = match std::env::var(ENV_PASSWORD) {
        Ok(password) if !password.is_empty() => password,
        _ => {
            let term = console::Term::stderr();
            term.write_str(&format!("Steam password for {username}: "))?;
            term.read_secure_line()?
        }
    };
    if password.is_empty() {
        bail!("a password is required for account logins");
    }
    Ok(Login::account(username, password))
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{bar:40.cyan/blue} {bytes}/{total_bytes} {msg} ETA {eta}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
