#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings for test infrastructure
#[cfg(test)]
use tokio_test as _;

pub mod error;
pub mod manager;
pub mod shutdown;
pub mod steamcmd;

mod store;
mod throttle;
mod worker;

// Re-export the public surface
pub use error::{JobError, SteamCmdError, SteamCmdResult};
pub use manager::JobManager;
pub use steamcmd::{InstallOutcome, SteamCmdInfo, SteamCmdSource};
