#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod appid;
pub mod error;
pub mod events;
pub mod job;
pub mod paths;
pub mod settings;

// Re-export commonly used types for convenience
pub use appid::AppId;
pub use error::CoreError;
pub use events::JobEvent;
pub use job::{DownloadJob, JobId, JobRequest, JobStatus, Login, ProgressSnapshot};
pub use paths::DataLayout;
pub use settings::Settings;
