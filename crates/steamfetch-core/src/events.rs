//! Canonical job event union.
//!
//! Every transport (SSE stream, CLI progress display) consumes the same
//! event type, serialized with a `type` tag:
//!
//! ```json
//! {"type":"job_progress","jobId":"...","percentage":42.0,"downloadedBytes":420,...}
//! ```
//!
//! Event names and payload fields are part of the wire contract with web
//! clients; the tests at the bottom lock them down.

use serde::{Deserialize, Serialize};

use crate::job::{DownloadJob, JobId, ProgressSnapshot};

/// Job lifecycle events, broadcast while a download runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// The subprocess has been spawned and the job is running.
    JobStarted {
        #[serde(rename = "jobId")]
        job_id: String,
        #[serde(rename = "appId")]
        app_id: u32,
        #[serde(rename = "installDir")]
        install_dir: String,
    },
    /// Byte-level progress, throttled at the source.
    JobProgress {
        #[serde(rename = "jobId")]
        job_id: String,
        percentage: f64,
        #[serde(rename = "downloadedBytes")]
        downloaded_bytes: u64,
        #[serde(rename = "totalBytes")]
        total_bytes: u64,
        #[serde(rename = "speedBps")]
        speed_bps: f64,
        #[serde(rename = "etaSeconds", skip_serializing_if = "Option::is_none")]
        eta_seconds: Option<u64>,
    },
    /// An output line that matched no known pattern.
    JobLog {
        #[serde(rename = "jobId")]
        job_id: String,
        line: String,
    },
    /// The subprocess exited with code zero.
    JobCompleted {
        #[serde(rename = "jobId")]
        job_id: String,
        #[serde(rename = "appId")]
        app_id: u32,
        #[serde(rename = "installDir")]
        install_dir: String,
    },
    /// The subprocess exited non-zero or could not be run.
    JobFailed {
        #[serde(rename = "jobId")]
        job_id: String,
        error: String,
    },
    /// The job was cancelled and its subprocess terminated.
    JobCancelled {
        #[serde(rename = "jobId")]
        job_id: String,
    },
}

impl JobEvent {
    #[must_use]
    pub fn started(job: &DownloadJob) -> Self {
        Self::JobStarted {
            job_id: job.id.to_string(),
            app_id: job.app_id.get(),
            install_dir: job.install_dir.display().to_string(),
        }
    }

    #[must_use]
    pub fn progress(job_id: &JobId, snapshot: ProgressSnapshot) -> Self {
        Self::JobProgress {
            job_id: job_id.to_string(),
            percentage: snapshot.percentage,
            downloaded_bytes: snapshot.downloaded_bytes,
            total_bytes: snapshot.total_bytes,
            speed_bps: snapshot.speed_bps,
            eta_seconds: snapshot.eta_seconds,
        }
    }

    #[must_use]
    pub fn log(job_id: &JobId, line: impl Into<String>) -> Self {
        Self::JobLog {
            job_id: job_id.to_string(),
            line: line.into(),
        }
    }

    #[must_use]
    pub fn completed(job: &DownloadJob) -> Self {
        Self::JobCompleted {
            job_id: job.id.to_string(),
            app_id: job.app_id.get(),
            install_dir: job.install_dir.display().to_string(),
        }
    }

    #[must_use]
    pub fn failed(job_id: &JobId, error: impl Into<String>) -> Self {
        Self::JobFailed {
            job_id: job_id.to_string(),
            error: error.into(),
        }
    }

    #[must_use]
    pub fn cancelled(job_id: &JobId) -> Self {
        Self::JobCancelled {
            job_id: job_id.to_string(),
        }
    }

    /// The job this event belongs to.
    #[must_use]
    pub fn job_id(&self) -> &str {
        match self {
            Self::JobStarted { job_id, .. }
            | Self::JobProgress { job_id, .. }
            | Self::JobLog { job_id, .. }
            | Self::JobCompleted { job_id, .. }
            | Self::JobFailed { job_id, .. }
            | Self::JobCancelled { job_id } => job_id,
        }
    }

    /// Transport-level event name, used as the SSE `event:` field.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::JobStarted { .. } => "job:started",
            Self::JobProgress { .. } => "job:progress",
            Self::JobLog { .. } => "job:log",
            Self::JobCompleted { .. } => "job:completed",
            Self::JobFailed { .. } => "job:failed",
            Self::JobCancelled { .. } => "job:cancelled",
        }
    }
}
