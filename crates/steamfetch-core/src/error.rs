//! Core error type.

use thiserror::Error;

use crate::paths::PathError;

/// Errors produced by the domain layer itself.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The submitted target is neither an app ID nor a store URL.
    #[error("Invalid download target: {0}")]
    InvalidTarget(String),

    /// Filesystem layout problem.
    #[error(transparent)]
    Path(#[from] PathError),
}
