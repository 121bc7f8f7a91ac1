//! Steam credential validation.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{SteamCmdError, SteamCmdResult};

/// How long a validation attempt may take before it is abandoned.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Validate Steam credentials with a login-and-quit session.
///
/// SteamCMD reports rejected credentials as a `FAILED` marker on stderr and
/// never reaches the download phase. The password goes to the subprocess as
/// an argument and is not logged or persisted anywhere.
pub async fn validate_credentials(
    binary: &Path,
    username: &str,
    password: &str,
) -> SteamCmdResult<()> {
    validate_with_timeout(binary, username, password, LOGIN_TIMEOUT).await
}

async fn validate_with_timeout(
    binary: &Path,
    username: &str,
    password: &str,
    limit: Duration,
) -> SteamCmdResult<()> {
    tracing::debug!(username, "validating Steam credentials");

    let output = timeout(
        limit,
        Command::new(binary)
            .arg("+login")
            .arg(username)
            .arg(password)
            .arg("+quit")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| SteamCmdError::LoginTimeout(limit.as_secs()))??;

    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.contains("FAILED") {
        let reason = stderr
            .lines()
            .find(|line| line.contains("FAILED"))
            .unwrap_or("login FAILED")
            .trim()
            .to_string();
        return Err(SteamCmdError::LoginFailed {
            username: username.to_string(),
            reason,
        });
    }

    Ok(())
}
