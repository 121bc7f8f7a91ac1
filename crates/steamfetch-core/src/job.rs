//! Download job model.
//!
//! A `DownloadJob` is the single unit of work the service manages. The
//! launcher creates one in `Pending`, the progress monitor moves it through
//! `Running` to a terminal status, and the next accepted submission replaces
//! it. At most one job exists per session.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::appid::AppId;

/// Unique identifier for a download job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of a download job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted, subprocess not yet spawned.
    Pending,
    /// Subprocess is running.
    Running,
    /// Exit code zero.
    Succeeded,
    /// Non-zero exit, spawn failure, or unreadable output.
    Failed,
    /// Terminated on user request.
    Cancelled,
}

impl JobStatus {
    /// String form used in API responses and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the job has reached a final state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Whether the job still occupies the single download slot.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Running)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that matches no [`JobStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown job status: {0}")]
pub struct ParseJobStatusError(String);

impl FromStr for JobStatus {
    type Err = ParseJobStatusError;

    /// Parse the string form produced by [`JobStatus::as_str`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParseJobStatusError(other.to_string())),
        }
    }
}

/// Byte-level progress of the active download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Completion percentage, 0.0 to 100.0.
    pub percentage: f64,
    /// Bytes downloaded so far.
    pub downloaded_bytes: u64,
    /// Total bytes to download (zero until the client reports it).
    pub total_bytes: u64,
    /// Average download speed in bytes per second.
    pub speed_bps: f64,
    /// Estimated seconds remaining, when the speed is known.
    pub eta_seconds: Option<u64>,
}

impl ProgressSnapshot {
    /// Build a snapshot from byte counts and a measured speed.
    ///
    /// The percentage is always recomputed from the byte ratio rather than
    /// taken from the client's own rounding.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_bytes(downloaded_bytes: u64, total_bytes: u64, speed_bps: f64) -> Self {
        let percentage = if total_bytes > 0 {
            (downloaded_bytes as f64 / total_bytes as f64) * 100.0
        } else {
            0.0
        };
        let eta_seconds = if speed_bps > 0.0 && total_bytes > downloaded_bytes {
            Some(((total_bytes - downloaded_bytes) as f64 / speed_bps) as u64)
        } else {
            None
        };
        Self {
            percentage,
            downloaded_bytes,
            total_bytes,
            speed_bps,
            eta_seconds,
        }
    }

    /// Snapshot for a download that finished successfully.
    #[must_use]
    pub const fn finished(total_bytes: u64) -> Self {
        Self {
            percentage: 100.0,
            downloaded_bytes: total_bytes,
            total_bytes,
            speed_bps: 0.0,
            eta_seconds: None,
        }
    }
}

/// Login used for the SteamCMD invocation.
///
/// Credentials live only in process memory. They are never serialized,
/// never written to disk, and never appear in debug output.
#[derive(Clone)]
pub enum Login {
    /// Anonymous login; enough for free and dedicated-server content.
    Anonymous,
    /// Steam account login.
    Account { username: String, password: String },
}

impl Login {
    #[must_use]
    pub fn account(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Account {
            username: username.into(),
            password: password.into(),
        }
    }

    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

impl fmt::Debug for Login {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Login::Anonymous"),
            Self::Account { username, .. } => f
                .debug_struct("Login::Account")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// A user-submitted download request, before validation.
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Raw target: a numeric app ID or a store URL.
    pub target: String,
    /// Login to use for the invocation.
    pub login: Login,
}

/// One download job and its lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadJob {
    pub id: JobId,
    pub app_id: AppId,
    /// Directory the content is installed into.
    pub install_dir: PathBuf,
    pub status: JobStatus,
    pub progress: ProgressSnapshot,
    /// Failure reason, set together with `JobStatus::Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    /// Set when the job reaches a terminal status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl DownloadJob {
    /// Create a fresh `Pending` job.
    #[must_use]
    pub fn new(app_id: AppId, install_dir: PathBuf) -> Self {
        Self {
            id: JobId::new(),
            app_id,
            install_dir,
            status: JobStatus::Pending,
            progress: ProgressSnapshot::default(),
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_job_is_pending_without_progress() {
        let job = DownloadJob::new(AppId::new(740), PathBuf::from("/tmp/740"));
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress.downloaded_bytes, 0);
        assert!(job.error.is_none());
        assert!(job.finished_at.is_none());
    }

    #[test]
    fn job_ids_are_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn status_terminal_and_active_partition() {
        for status in [
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Succeeded,
            JobStatus::Failed,
            JobStatus::Cancelled,
        ] {
            assert_ne!(status.is_terminal(), status.is_active());
        }
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&JobStatus::Succeeded).unwrap();
        assert_eq!(json, "\"succeeded\"");
    }

    #[test]
    fn status_round_trips_through_its_string_form() {
        for status in [
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Succeeded,
            JobStatus::Failed,
            JobStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<JobStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_status_strings_are_rejected() {
        assert!("paused".parse::<JobStatus>().is_err());
        assert!("".parse::<JobStatus>().is_err());
        assert!("Pending".parse::<JobStatus>().is_err());
    }

    #[test]
    fn progress_percentage_comes_from_byte_ratio() {
        let snapshot = ProgressSnapshot::from_bytes(250, 1000, 0.0);
        assert!((snapshot.percentage - 25.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.eta_seconds, None);
    }

    #[test]
    fn progress_eta_from_remaining_bytes_and_speed() {
        let snapshot = ProgressSnapshot::from_bytes(500, 1000, 100.0);
        assert_eq!(snapshot.eta_seconds, Some(5));
    }

    #[test]
    fn progress_with_unknown_total_is_zero_percent() {
        let snapshot = ProgressSnapshot::from_bytes(123, 0, 10.0);
        assert!(snapshot.percentage.abs() < f64::EPSILON);
        assert_eq!(snapshot.eta_seconds, None);
    }

    #[test]
    fn finished_progress_is_complete() {
        let snapshot = ProgressSnapshot::finished(4096);
        assert!((snapshot.percentage - 100.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.downloaded_bytes, 4096);
    }

    #[test]
    fn login_debug_never_shows_password() {
        let login = Login::account("alice", "hunter2");
        let rendered = format!("{login:?}");
        assert!(rendered.contains("alice"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn job_serialization_omits_empty_optionals() {
        let job = DownloadJob::new(AppId::new(10), PathBuf::from("/tmp/10"));
        let json = serde_json::to_string(&job).unwrap();
        assert!(!json.contains("\"error\""));
        assert!(!json.contains("\"finished_at\""));
        assert!(json.contains("\"pending\""));
    }
}
