//! Owned session state for the single download job.
//!
//! The store is the one mutable shared value in the process. The launcher
//! installs a fresh job, the worker moves it through its lifecycle, and
//! every reader gets cloned snapshots. Nothing here is global; the
//! [`JobManager`](crate::manager::JobManager) owns the store and decides
//! who may write.

use std::collections::VecDeque;
use std::sync::RwLock;

use chrono::Utc;

use steamfetch_core::job::{DownloadJob, JobId, JobStatus, ProgressSnapshot};

/// Maximum output lines retained for the current job.
const MAX_LOG_LINES: usize = 500;

/// Ring buffer of recent subprocess output.
#[derive(Debug, Default)]
struct LogBuffer {
    lines: VecDeque<String>,
}

impl LogBuffer {
    fn push(&mut self, line: &str) {
        if self.lines.len() >= MAX_LOG_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    fn snapshot(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

#[derive(Debug, Default)]
struct JobState {
    current: Option<DownloadJob>,
    logs: LogBuffer,
}

/// Thread-safe holder of the session's job and its log excerpt.
///
/// Mutations carry the job ID they belong to and are ignored when it does
/// not match the stored job, so a stale worker can never touch its
/// successor's state. Terminal statuses are final.
#[derive(Debug, Default)]
pub(crate) struct JobStore {
    state: RwLock<JobState>,
}

impl JobStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current job, if any was ever submitted.
    pub(crate) fn current(&self) -> Option<DownloadJob> {
        self.state.read().unwrap().current.clone()
    }

    /// Recent output lines of the current job.
    pub(crate) fn logs(&self) -> Vec<String> {
        self.state.read().unwrap().logs.snapshot()
    }

    /// Install a fresh job, dropping the previous one and its logs.
    pub(crate) fn replace(&self, job: DownloadJob) {
        let mut state = self.state.write().unwrap();
        state.current = Some(job);
        state.logs = LogBuffer::default();
    }

    /// Append an output line to the job's log excerpt.
    pub(crate) fn append_log(&self, id: &JobId, line: &str) {
        let mut state = self.state.write().unwrap();
        if state.current.as_ref().is_some_and(|job| job.id == *id) {
            state.logs.push(line);
        }
    }

    /// Update progress of the stored job.
    pub(crate) fn set_progress(&self, id: &JobId, progress: ProgressSnapshot) {
        let mut state = self.state.write().unwrap();
        if let Some(job) = state.current.as_mut() {
            if job.id == *id && !job.status.is_terminal() {
                job.progress = progress;
            }
        }
    }

    /// Move a `Pending` job to `Running`. Returns the updated snapshot.
    pub(crate) fn mark_running(&self, id: &JobId) -> Option<DownloadJob> {
        let mut state = self.state.write().unwrap();
        let job = state.current.as_mut()?;
        if job.id != *id || job.status != JobStatus::Pending {
            return None;
        }
        job.status = JobStatus::Running;
        Some(job.clone())
    }

    /// Move the job to a terminal status. The first terminal transition
    /// wins; later attempts are ignored.
    pub(crate) fn finish(
        &self,
        id: &JobId,
        status: JobStatus,
        error: Option<String>,
    ) -> Option<DownloadJob> {
        debug_assert!(status.is_terminal());
        let mut state = self.state.write().unwrap();
        let job = state.current.as_mut()?;
        if job.id != *id || job.status.is_terminal() {
            return None;
        }
        job.status = status;
        job.error = error;
        job.finished_at = Some(Utc::now());
        Some(job.clone())
    }
}
