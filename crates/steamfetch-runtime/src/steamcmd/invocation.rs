//! SteamCMD command-line construction.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

use steamfetch_core::AppId;
use steamfetch_core::job::Login;

/// Builder for one SteamCMD download invocation.
///
/// Argument order matters to SteamCMD: `+login` must come before
/// `+force_install_dir`, which must come before `+app_update`.
pub struct SteamCmdInvocation {
    binary: PathBuf,
    login: Login,
    install_dir: PathBuf,
    app_id: AppId,
    validate: bool,
}

impl SteamCmdInvocation {
    #[must_use]
    pub fn new(binary: PathBuf, login: Login, install_dir: PathBuf, app_id: AppId) -> Self {
        Self {
            binary,
            login,
            install_dir,
            app_id,
            validate: true,
        }
    }

    /// Toggle the `validate` flag on `+app_update`. On by default.
    #[must_use]
    pub const fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["+login".to_string()];
        match &self.login {
            Login::Anonymous => args.push("anonymous".to_string()),
            Login::Account { username, password } => {
                args.push(username.clone());
                args.push(password.clone());
            }
        }
        args.push("+force_install_dir".to_string());
        args.push(self.install_dir.display().to_string());
        args.push("+app_update".to_string());
        args.push(self.app_id.to_string());
        if self.validate {
            args.push("validate".to_string());
        }
        args.push("+quit".to_string());
        args
    }

    /// Build the command with piped output, ready to spawn.
    ///
    /// `kill_on_drop` is set so an aborted worker cannot leak a download.
    #[must_use]
    pub fn build(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    /// Loggable rendering of the invocation with the password removed.
    #[must_use]
    pub fn redacted(&self) -> String {
        let mut parts = vec![self.binary.display().to_string(), "+login".to_string()];
        match &self.login {
            Login::Anonymous => parts.push("anonymous".to_string()),
            Login::Account { username, .. } => {
                parts.push(username.clone());
                parts.push("<redacted>".to_string());
            }
        }
        parts.push("+force_install_dir".to_string());
        parts.push(self.install_dir.display().to_string());
        parts.push("+app_update".to_string());
        parts.push(self.app_id.to_string());
        if self.validate {
            parts.push("validate".to_string());
        }
        parts.push("+quit".to_string());
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(login: Login) -> SteamCmdInvocation {
        SteamCmdInvocation::new(
            PathBuf::from("/opt/steamcmd/steamcmd.sh"),
            login,
            PathBuf::from("/data/downloads/740"),
            AppId::new(740),
        )
    }

    #[test]
    fn anonymous_arguments_in_steamcmd_order() {
        assert_eq!(
            invocation(Login::Anonymous).args(),
            vec![
                "+login",
                "anonymous",
                "+force_install_dir",
                "/data/downloads/740",
                "+app_update",
                "740",
                "validate",
                "+quit",
            ]
        );
    }

    #[test]
    fn account_login_precedes_install_dir() {
        let args = invocation(Login::account("alice", "hunter2")).args();
        assert_eq!(&args[..3], &["+login", "alice", "hunter2"]);
        assert_eq!(args[3], "+force_install_dir");
    }

    #[test]
    fn validate_flag_can_be_dropped() {
        let args = invocation(Login::Anonymous).validate(false).args();
        assert!(!args.contains(&"validate".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("+quit"));
    }

    #[test]
    fn redacted_preview_hides_the_password() {
        let preview = invocation(Login::account("alice", "hunter2")).redacted();
        assert!(preview.contains("alice"));
        assert!(preview.contains("<redacted>"));
        assert!(!preview.contains("hunter2"));
    }

    #[test]
    fn redacted_preview_shows_anonymous_login() {
        let preview = invocation(Login::Anonymous).redacted();
        assert!(preview.contains("+login anonymous"));
    }
}
