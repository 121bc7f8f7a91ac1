//! Error types for SteamCMD orchestration.

use std::path::PathBuf;

use thiserror::Error;

use steamfetch_core::CoreError;
use steamfetch_core::paths::PathError;

/// Errors from locating, installing, or talking to SteamCMD.
#[derive(Debug, Error)]
pub enum SteamCmdError {
    /// No binary found anywhere: no override, no managed copy, nothing on PATH.
    #[error("SteamCMD is not installed. Run `steamfetch steamcmd install` to set it up")]
    NotInstalled,

    /// A binary path exists in configuration but is missing or not executable.
    #[error("SteamCMD binary missing or not executable: {path}")]
    NotExecutable { path: PathBuf },

    /// Archive download failed.
    #[error("SteamCMD download failed: {0}")]
    DownloadFailed(String),

    /// Archive could not be unpacked.
    #[error("Failed to extract SteamCMD archive: {0}")]
    ExtractionFailed(String),

    /// Steam rejected the supplied account credentials.
    #[error("Steam login failed for {username}: {reason}")]
    LoginFailed { username: String, reason: String },

    /// Credential validation did not finish in time.
    #[error("Credential validation timed out after {0} seconds")]
    LoginTimeout(u64),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for SteamCMD operations.
pub type SteamCmdResult<T> = Result<T, SteamCmdError>;

/// Errors from the job manager's lifecycle operations.
#[derive(Debug, Error)]
pub enum JobError {
    /// The single download slot is occupied.
    #[error("A download is already running (job {job_id} for app {app_id})")]
    AlreadyRunning { job_id: String, app_id: u32 },

    /// Cancel was requested but no job has ever been submitted.
    #[error("No download job exists")]
    NoActiveJob,

    /// The submitted target is neither an app ID nor a store URL.
    #[error("Invalid download target: {0}")]
    InvalidTarget(String),

    #[error(transparent)]
    SteamCmd(#[from] SteamCmdError),

    #[error(transparent)]
    Path(#[from] PathError),
}

impl From<CoreError> for JobError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidTarget(target) => Self::InvalidTarget(target),
            CoreError::Path(path) => Self::Path(path),
        }
    }
}
