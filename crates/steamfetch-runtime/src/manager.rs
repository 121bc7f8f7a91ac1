//! Job manager: accepts submissions, enforces the one-job-at-a-time rule,
//! and owns the session state and the event channel.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use steamfetch_core::AppId;
use steamfetch_core::events::JobEvent;
use steamfetch_core::job::{DownloadJob, JobId, JobRequest, Login};
use steamfetch_core::paths::{DataLayout, DirectoryCreationStrategy, ensure_directory};

use crate::error::JobError;
use crate::steamcmd::{self, SteamCmdInvocation};
use crate::store::JobStore;
use crate::worker::{self, WorkerContext};

/// Capacity of the job event broadcast channel.
const EVENT_CAPACITY: usize = 256;

/// Handle to the worker currently holding the download slot.
struct ActiveWorker {
    job_id: JobId,
    cancel: CancellationToken,
}

/// Owns the single download slot.
///
/// All shared state hangs off this value: the job store, the event channel,
/// and the cancellation handle of the active worker. Callers hold the
/// manager in an `Arc` and everything else is passed down explicitly.
pub struct JobManager {
    layout: DataLayout,
    steamcmd_override: Option<PathBuf>,
    store: Arc<JobStore>,
    events: broadcast::Sender<JobEvent>,
    active: Mutex<Option<ActiveWorker>>,
}

impl JobManager {
    #[must_use]
    pub fn new(layout: DataLayout, steamcmd_override: Option<PathBuf>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            layout,
            steamcmd_override,
            store: Arc::new(JobStore::new()),
            events,
            active: Mutex::new(None),
        }
    }

    /// Subscribe to job lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    /// The broadcast sender, for adapters that fan events out further.
    #[must_use]
    pub fn event_sender(&self) -> broadcast::Sender<JobEvent> {
        self.events.clone()
    }

    /// Snapshot of the current job, if any was ever submitted.
    #[must_use]
    pub fn current_job(&self) -> Option<DownloadJob> {
        self.store.current()
    }

    /// Recent output lines of the current job.
    #[must_use]
    pub fn job_logs(&self) -> Vec<String> {
        self.store.logs()
    }

    #[must_use]
    pub const fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Launch a new download job.
    ///
    /// Validates the target, resolves SteamCMD, and for account logins
    /// verifies the credentials up front, so a rejected submission never
    /// disturbs a running job. The returned job is in `Pending`; the worker
    /// moves it forward from there.
    pub async fn start(&self, request: JobRequest) -> Result<DownloadJob, JobError> {
        let app_id = AppId::parse(&request.target)?;
        let client = steamcmd::resolve(&self.layout, self.steamcmd_override.as_deref())?;

        if let Login::Account { username, password } = &request.login {
            steamcmd::validate_credentials(&client.path, username, password).await?;
        }

        let install_dir = self.layout.app_install_dir(app_id);

        // The lock spans the occupancy check and the slot handover so two
        // submissions cannot both pass.
        let mut active = self.active.lock().unwrap();
        if let Some(current) = self.store.current() {
            if current.status.is_active() {
                return Err(JobError::AlreadyRunning {
                    job_id: current.id.to_string(),
                    app_id: current.app_id.get(),
                });
            }
        }

        ensure_directory(&install_dir, DirectoryCreationStrategy::AutoCreate)?;

        let job = DownloadJob::new(app_id, install_dir.clone());
        self.store.replace(job.clone());

        let cancel = CancellationToken::new();
        *active = Some(ActiveWorker {
            job_id: job.id.clone(),
            cancel: cancel.clone(),
        });

        let invocation =
            SteamCmdInvocation::new(client.path, request.login, install_dir, app_id);
        tracing::info!(
            %app_id,
            job_id = %job.id,
            command = %invocation.redacted(),
            "starting download job"
        );

        let ctx = WorkerContext {
            job_id: job.id.clone(),
            invocation,
            transcript_path: self.layout.job_log_path(&job.id),
            cancel,
        };
        tokio::spawn(worker::run_job(ctx, Arc::clone(&self.store), self.events.clone()));

        Ok(job)
    }

    /// Request cancellation of the active job.
    ///
    /// A no-op for jobs that already finished, so clients can race the
    /// completion without seeing errors. Fails only when no job was ever
    /// submitted. Returns the job snapshot as of the request; the
    /// `Cancelled` status lands asynchronously once the subprocess is gone.
    pub fn cancel(&self) -> Result<DownloadJob, JobError> {
        let current = self.store.current().ok_or(JobError::NoActiveJob)?;
        if current.status.is_active() {
            let active = self.active.lock().unwrap();
            if let Some(worker) = active.as_ref() {
                if worker.job_id == current.id {
                    tracing::info!(job_id = %current.id, "cancelling download job");
                    worker.cancel.cancel();
                }
            }
        }
        Ok(current)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::Duration;

    use tempfile::TempDir;

    use steamfetch_core::job::JobStatus;

    use crate::error::SteamCmdError;

    /// Drop a fake SteamCMD shell script into `dir` and make it executable.
    fn fake_steamcmd(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("steamcmd.sh");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh").unwrap();
        writeln!(file, "{body}").unwrap();
        drop(file);
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn manager_with_script(tmp: &TempDir, body: &str) -> JobManager {
        let script = fake_steamcmd(tmp.path(), body);
        let layout = DataLayout::new(tmp.path().join("data"));
        layout.ensure_all().unwrap();
        JobManager::new(layout, Some(script))
    }

    fn anonymous(target: &str) -> JobRequest {
        JobRequest {
            target: target.to_string(),
            login: Login::Anonymous,
        }
    }

    async fn wait_for_terminal(manager: &JobManager) -> DownloadJob {
        for _ in 0..400 {
            if let Some(job) = manager.current_job() {
                if job.status.is_terminal() {
                    return job;
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("job never reached a terminal status");
    }

    async fn wait_for(manager: &JobManager, predicate: impl Fn(&DownloadJob) -> bool) -> DownloadJob {
        for _ in 0..400 {
            if let Some(job) = manager.current_job() {
                if predicate(&job) {
                    return job;
                }
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("condition never became true");
    }

    #[tokio::test]
    async fn fresh_manager_has_no_job() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(&tmp, "exit 0");
        assert!(manager.current_job().is_none());
        assert!(manager.job_logs().is_empty());
    }

    #[tokio::test]
    async fn clean_exit_succeeds_with_full_progress() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(
            &tmp,
            concat!(
                "echo 'Loading Steam API...OK'\n",
                "echo \"Update state (0x61) downloading, progress: 50.00 (512 / 1024)\"\n",
                "echo \"Success! App '740' fully installed.\"\n",
                "exit 0",
            ),
        );

        let job = manager.start(anonymous("740")).await.unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.app_id.get(), 740);

        let done = wait_for_terminal(&manager).await;
        assert_eq!(done.status, JobStatus::Succeeded);
        assert!((done.progress.percentage - 100.0).abs() < f64::EPSILON);
        assert_eq!(done.progress.total_bytes, 1024);
        assert!(done.finished_at.is_some());

        // Unmatched lines end up in the log excerpt.
        let logs = manager.job_logs();
        assert!(logs.iter().any(|line| line.contains("Loading Steam API")));
    }

    #[tokio::test]
    async fn nonzero_exit_fails_with_error_detail() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(
            &tmp,
            concat!(
                "echo \"ERROR! Failed to install app '740' (No subscription)\"\n",
                "exit 8",
            ),
        );

        manager.start(anonymous("740")).await.unwrap();
        let done = wait_for_terminal(&manager).await;
        assert_eq!(done.status, JobStatus::Failed);
        assert!(done.error.as_deref().unwrap().contains("No subscription"));
    }

    #[tokio::test]
    async fn exit_code_without_markers_becomes_the_reason() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(&tmp, "echo 'working'; exit 3");

        manager.start(anonymous("10")).await.unwrap();
        let done = wait_for_terminal(&manager).await;
        assert_eq!(done.status, JobStatus::Failed);
        assert!(done.error.as_deref().unwrap().contains("3"));
    }

    #[tokio::test]
    async fn progress_lines_update_the_snapshot_mid_flight() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(
            &tmp,
            concat!(
                "echo \"Update state (0x61) downloading, progress: 42.00 (420 / 1000)\"\n",
                "sleep 30",
            ),
        );

        manager.start(anonymous("440")).await.unwrap();
        let running = wait_for(&manager, |job| job.progress.total_bytes == 1000).await;
        assert!((running.progress.percentage - 42.0).abs() < f64::EPSILON);
        assert_eq!(running.progress.downloaded_bytes, 420);

        manager.cancel().unwrap();
        let done = wait_for_terminal(&manager).await;
        assert_eq!(done.status, JobStatus::Cancelled);
    }

    #[tokio::test]
    async fn second_submission_is_rejected_while_running() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(&tmp, "sleep 30");

        let first = manager.start(anonymous("740")).await.unwrap();
        wait_for(&manager, |job| job.status == JobStatus::Running).await;

        let err = manager.start(anonymous("440")).await.unwrap_err();
        match err {
            JobError::AlreadyRunning { job_id, app_id } => {
                assert_eq!(job_id, first.id.to_string());
                assert_eq!(app_id, 740);
            }
            other => panic!("expected AlreadyRunning, got {other:?}"),
        }

        // The running job is untouched by the rejection.
        let current = manager.current_job().unwrap();
        assert_eq!(current.id, first.id);
        assert_eq!(current.status, JobStatus::Running);

        manager.cancel().unwrap();
        wait_for_terminal(&manager).await;
    }

    #[tokio::test]
    async fn finished_job_frees_the_slot() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(&tmp, "exit 0");

        manager.start(anonymous("10")).await.unwrap();
        wait_for_terminal(&manager).await;

        let second = manager.start(anonymous("20")).await.unwrap();
        assert_eq!(second.app_id.get(), 20);
        let done = wait_for_terminal(&manager).await;
        assert_eq!(done.id, second.id);
    }

    #[tokio::test]
    async fn cancel_stops_the_subprocess_promptly() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(&tmp, "sleep 30");

        manager.start(anonymous("740")).await.unwrap();
        wait_for(&manager, |job| job.status == JobStatus::Running).await;

        let started = std::time::Instant::now();
        manager.cancel().unwrap();
        let done = wait_for_terminal(&manager).await;
        assert_eq!(done.status, JobStatus::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn cancel_after_completion_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(&tmp, "exit 0");

        manager.start(anonymous("10")).await.unwrap();
        wait_for_terminal(&manager).await;

        let job = manager.cancel().unwrap();
        assert_eq!(job.status, JobStatus::Succeeded);
        assert_eq!(manager.current_job().unwrap().status, JobStatus::Succeeded);
    }

    #[tokio::test]
    async fn cancel_without_any_job_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(&tmp, "exit 0");
        assert!(matches!(manager.cancel().unwrap_err(), JobError::NoActiveJob));
    }

    #[tokio::test]
    async fn invalid_target_is_rejected_up_front() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(&tmp, "exit 0");

        let err = manager.start(anonymous("not-a-game")).await.unwrap_err();
        assert!(matches!(err, JobError::InvalidTarget(_)));
        assert!(manager.current_job().is_none());
    }

    #[tokio::test]
    async fn missing_client_is_a_configuration_error() {
        let tmp = TempDir::new().unwrap();
        let layout = DataLayout::new(tmp.path().join("data"));
        layout.ensure_all().unwrap();
        let manager = JobManager::new(layout, Some(tmp.path().join("missing.sh")));

        let err = manager.start(anonymous("740")).await.unwrap_err();
        assert!(matches!(
            err,
            JobError::SteamCmd(SteamCmdError::NotExecutable { .. })
        ));
    }

    #[tokio::test]
    async fn bad_credentials_never_create_a_job() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(
            &tmp,
            "echo 'FAILED login with result code Invalid Password' >&2; exit 5",
        );

        let err = manager
            .start(JobRequest {
                target: "740".to_string(),
                login: Login::account("alice", "wrong"),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            JobError::SteamCmd(SteamCmdError::LoginFailed { .. })
        ));
        assert!(manager.current_job().is_none());
    }

    #[tokio::test]
    async fn events_cover_the_whole_lifecycle() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(
            &tmp,
            concat!(
                "echo 'chatter'\n",
                "echo \"Update state (0x61) downloading, progress: 10.00 (100 / 1000)\"\n",
                "exit 0",
            ),
        );

        let mut events = manager.subscribe();
        manager.start(anonymous("740")).await.unwrap();
        wait_for_terminal(&manager).await;

        let mut names = Vec::new();
        while let Ok(event) = events.try_recv() {
            names.push(event.event_name());
        }
        assert!(names.contains(&"job:started"));
        assert!(names.contains(&"job:progress"));
        assert!(names.contains(&"job:log"));
        assert_eq!(names.last(), Some(&"job:completed"));
    }

    #[tokio::test]
    async fn transcript_is_written_to_the_logs_dir() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(&tmp, "echo 'line one'; exit 0");

        let job = manager.start(anonymous("740")).await.unwrap();
        wait_for_terminal(&manager).await;

        let transcript = manager.layout().job_log_path(&job.id);
        // The worker flushes before it finishes the job.
        let contents = std::fs::read_to_string(transcript).unwrap();
        assert!(contents.contains("line one"));
    }

    #[tokio::test]
    async fn install_dir_is_created_before_the_client_runs() {
        let tmp = TempDir::new().unwrap();
        let manager = manager_with_script(&tmp, "exit 0");

        let job = manager.start(anonymous("740")).await.unwrap();
        assert!(job.install_dir.is_dir());
        assert!(job.install_dir.ends_with("downloads/740"));
        wait_for_terminal(&manager).await;
    }
}
