//! Path resolution and directory errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from resolving or preparing filesystem locations.
#[derive(Debug, Error)]
pub enum PathError {
    /// The user's home directory could not be determined.
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// A required directory does not exist and auto-creation was disallowed.
    #[error("Directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    /// The path exists but is not a directory.
    #[error("Path exists but is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory creation failed.
    #[error("Failed to create directory {path}: {source}")]
    CreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The directory exists but cannot be written to.
    #[error("Directory is not writable: {path}: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
