//! SteamCMD management subcommands.

use clap::Subcommand;

/// SteamCMD installation commands.
#[derive(Subcommand)]
pub enum SteamCmdCommand {
    /// Download and install SteamCMD into the data directory
    Install {
        /// Reinstall even when a managed copy already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Show where SteamCMD was found, if anywhere
    Status,
}
