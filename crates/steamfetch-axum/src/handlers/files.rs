//! Downloaded-file listing.
//!
//! The actual bytes are served by `ServeDir` under `/files`; this handler
//! produces the JSON listing the UI renders, with shareable links built
//! from the configured public URL.

use std::path::Path;

use axum::Json;
use axum::extract::{Path as PathParam, State};
use serde::Serialize;

use steamfetch_core::AppId;

use crate::error::HttpError;
use crate::state::AppState;

/// One file in an app's install directory.
#[derive(Debug, Serialize)]
pub struct FileEntry {
    /// Path relative to the app's directory, always `/`-separated.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Direct download link.
    pub url: String,
}

/// Recursive listing of one app's downloaded files.
#[derive(Debug, Serialize)]
pub struct FileListing {
    pub app_id: u32,
    pub files: Vec<FileEntry>,
    pub total_bytes: u64,
}

/// `GET /api/files/{app_id}`
pub async fn list(
    State(state): State<AppState>,
    PathParam(app_id): PathParam<u32>,
) -> Result<Json<FileListing>, HttpError> {
    let dir = state.layout.app_install_dir(AppId::new(app_id));
    if !dir.is_dir() {
        return Err(HttpError::NotFound(format!(
            "no downloaded files for app {app_id}"
        )));
    }

    let base = state.settings.public_url.clone().unwrap_or_default();
    let listing = tokio::task::spawn_blocking(move || collect_listing(&dir, app_id, &base))
        .await
        .map_err(|err| HttpError::Internal(err.to_string()))??;
    Ok(Json(listing))
}

/// Walk the install directory and build a sorted listing. Steam installs
/// can hold thousands of files, hence the blocking-task wrapper above.
fn collect_listing(dir: &Path, app_id: u32, public_base: &str) -> Result<FileListing, HttpError> {
    let mut files = Vec::new();
    let mut total_bytes = 0_u64;
    walk(dir, dir, app_id, public_base, &mut files, &mut total_bytes)?;
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(FileListing {
        app_id,
        files,
        total_bytes,
    })
}

fn walk(
    root: &Path,
    current: &Path,
    app_id: u32,
    public_base: &str,
    out: &mut Vec<FileEntry>,
    total_bytes: &mut u64,
) -> Result<(), HttpError> {
    let read_error =
        |err: std::io::Error| HttpError::Internal(format!("failed to read {}: {err}", current.display()));

    for entry in std::fs::read_dir(current).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let path = entry.path();
        if path.is_dir() {
            walk(root, &path, app_id, public_base, out, total_bytes)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            let size = entry.metadata().map_err(read_error)?.len();
            let rel = relative.to_string_lossy().replace('\\', "/");
            out.push(FileEntry {
                url: format!("{public_base}/files/{app_id}/{rel}"),
                path: rel,
                size,
            });
            *total_bytes += size;
        }
    }
    Ok(())
}
