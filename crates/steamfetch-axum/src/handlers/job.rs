//! Job lifecycle handlers: submit, status, cancel, logs.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use steamfetch_core::Settings;
use steamfetch_core::job::{DownloadJob, JobRequest, JobStatus, Login};

use crate::error::HttpError;
use crate::state::AppState;

/// Request body for submitting a download.
///
/// Credentials are consumed here and handed to the job manager in memory;
/// they are never echoed back in any response or event.
#[derive(Debug, Deserialize)]
pub struct SubmitJobRequest {
    /// App ID or store URL. `game` is accepted as a legacy alias.
    #[serde(alias = "game")]
    pub target: String,
    /// Force anonymous login even if credentials are present.
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl SubmitJobRequest {
    fn login(&self) -> Result<Login, HttpError> {
        if self.anonymous {
            return Ok(Login::Anonymous);
        }
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) if !username.is_empty() => {
                Ok(Login::account(username, password))
            }
            (None, None) => Ok(Login::Anonymous),
            _ => Err(HttpError::BadRequest(
                "username and password must be provided together".to_string(),
            )),
        }
    }
}

/// Job snapshot plus derived links.
#[derive(Debug, Serialize)]
pub struct JobView {
    #[serde(flatten)]
    pub job: DownloadJob,
    /// Browsable location of the downloaded files, present once the job
    /// has succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files_url: Option<String>,
}

impl JobView {
    fn build(job: DownloadJob, settings: &Settings) -> Self {
        let files_url = matches!(job.status, JobStatus::Succeeded).then(|| {
            let base = settings.public_url.as_deref().unwrap_or("");
            format!("{base}/files/{}/", job.app_id)
        });
        Self { job, files_url }
    }
}

/// Wrapper for the current-job endpoint; `job` is `null` before the first
/// submission.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job: Option<JobView>,
}

/// Recent output lines of the current job.
#[derive(Debug, Serialize)]
pub struct JobLogsResponse {
    pub lines: Vec<String>,
}

/// `GET /api/job`
pub async fn status(State(state): State<AppState>) -> Json<JobStatusResponse> {
    let job = state
        .jobs
        .current_job()
        .map(|job| JobView::build(job, &state.settings));
    Json(JobStatusResponse { job })
}

/// `POST /api/job`
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitJobRequest>,
) -> Result<Json<JobView>, HttpError> {
    let login = request.login()?;
    let job = state
        .jobs
        .start(JobRequest {
            target: request.target,
            login,
        })
        .await?;
    Ok(Json(JobView::build(job, &state.settings)))
}

/// `POST /api/job/cancel`
pub async fn cancel(State(state): State<AppState>) -> Result<Json<JobView>, HttpError> {
    let job = state.jobs.cancel()?;
    Ok(Json(JobView::build(job, &state.settings)))
}

/// `GET /api/job/logs`
pub async fn logs(State(state): State<AppState>) -> Json<JobLogsResponse> {
    Json(JobLogsResponse {
        lines: state.jobs.job_logs(),
    })
}
