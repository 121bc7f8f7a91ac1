//! HTTP error mapping.
//!
//! Domain errors are translated here and nowhere else, so the status codes
//! clients see stay consistent: 400 for bad input, 401 for rejected
//! credentials, 404 for "nothing there", 409 for the occupied download
//! slot, 503 when SteamCMD itself is unavailable.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use steamfetch_runtime::{JobError, SteamCmdError};

/// Web-facing error.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body attached to every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl HttpError {
    const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JobError> for HttpError {
    fn from(err: JobError) -> Self {
        let message = err.to_string();
        match err {
            JobError::SteamCmd(inner) => inner.into(),
            JobError::AlreadyRunning { .. } => Self::Conflict(message),
            JobError::NoActiveJob => Self::NotFound(message),
            JobError::InvalidTarget(_) | JobError::Path(_) => Self::BadRequest(message),
        }
    }
}

impl From<SteamCmdError> for HttpError {
    fn from(err: SteamCmdError) -> Self {
        let message = err.to_string();
        match err {
            SteamCmdError::LoginFailed { .. } | SteamCmdError::LoginTimeout(_) => {
                Self::Unauthorized(message)
            }
            SteamCmdError::NotInstalled | SteamCmdError::NotExecutable { .. } => {
                Self::ServiceUnavailable(message)
            }
            SteamCmdError::DownloadFailed(_)
            | SteamCmdError::ExtractionFailed(_)
            | SteamCmdError::Path(_)
            | SteamCmdError::Io(_) => Self::Internal(message),
        }
    }
}
