//! Filesystem layout.
//!
//! Everything steamfetch writes lives under one data directory:
//!
//! ```text
//! <data_dir>/
//!   steamcmd/     managed SteamCMD installation
//!   downloads/    one subdirectory per app ID
//!   logs/         one transcript file per job
//! ```

mod ensure;
mod error;

pub use ensure::{DirectoryCreationStrategy, ensure_directory, verify_writable};
pub use error::PathError;

use std::path::{Path, PathBuf};

use crate::appid::AppId;
use crate::job::JobId;

/// Directory name under the user's home directory.
pub const DEFAULT_DATA_DIR_NAME: &str = ".steamfetch";

/// Resolve the default data directory (`~/.steamfetch`).
pub fn default_data_dir() -> Result<PathBuf, PathError> {
    dirs::home_dir()
        .map(|home| home.join(DEFAULT_DATA_DIR_NAME))
        .ok_or(PathError::NoHomeDir)
}

/// On-disk layout rooted at the data directory.
#[derive(Debug, Clone)]
pub struct DataLayout {
    data_dir: PathBuf,
}

impl DataLayout {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Layout rooted at `~/.steamfetch`.
    pub fn with_default_root() -> Result<Self, PathError> {
        Ok(Self::new(default_data_dir()?))
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Where the managed SteamCMD installation lives.
    #[must_use]
    pub fn steamcmd_dir(&self) -> PathBuf {
        self.data_dir.join("steamcmd")
    }

    /// Parent directory of all per-app install directories.
    #[must_use]
    pub fn downloads_dir(&self) -> PathBuf {
        self.data_dir.join("downloads")
    }

    /// Where per-job transcripts are written.
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Install directory for one app: `downloads/<app_id>`.
    #[must_use]
    pub fn app_install_dir(&self, app_id: AppId) -> PathBuf {
        self.downloads_dir().join(app_id.to_string())
    }

    /// Transcript file for one job: `logs/job-<id>.log`.
    #[must_use]
    pub fn job_log_path(&self, job_id: &JobId) -> PathBuf {
        self.logs_dir().join(format!("job-{job_id}.log"))
    }

    /// Create the working directories, verifying each is writable.
    pub fn ensure_all(&self) -> Result<(), PathError> {
        for dir in [
            self.data_dir.clone(),
            self.steamcmd_dir(),
            self.downloads_dir(),
            self.logs_dir(),
        ] {
            ensure_directory(&dir, DirectoryCreationStrategy::AutoCreate)?;
        }
        Ok(())
    }
}
