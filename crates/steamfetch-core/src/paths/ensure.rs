//! Directory creation and writability checks.

use std::path::Path;

use super::error::PathError;

/// What to do when a required directory is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryCreationStrategy {
    /// Create the directory (and parents) if missing.
    AutoCreate,
    /// Fail if the directory does not exist.
    Disallow,
}

/// Ensure `path` exists as a writable directory.
pub fn ensure_directory(path: &Path, strategy: DirectoryCreationStrategy) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
    } else {
        match strategy {
            DirectoryCreationStrategy::AutoCreate => {
                std::fs::create_dir_all(path).map_err(|source| PathError::CreateFailed {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            DirectoryCreationStrategy::Disallow => {
                return Err(PathError::DirectoryNotFound(path.to_path_buf()));
            }
        }
    }
    verify_writable(path)
}

/// Probe writability by creating and removing a temp file.
pub fn verify_writable(path: &Path) -> Result<(), PathError> {
    let probe = path.join(".steamfetch_write_test");
    std::fs::write(&probe, b"probe").map_err(|source| PathError::NotWritable {
        path: path.to_path_buf(),
        source,
    })?;
    // Removal failure is not fatal; the probe is empty and hidden.
    let _ = std::fs::remove_file(&probe);
    Ok(())
}
