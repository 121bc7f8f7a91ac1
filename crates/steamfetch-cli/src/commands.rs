//! Main commands enum.

use clap::Subcommand;

use crate::steamcmd_commands::SteamCmdCommand;

/// Available steamfetch commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the web UI and HTTP API
    Serve {
        /// Port to listen on (also via STEAMFETCH_PORT; default 7860)
        #[arg(short, long)]
        port: Option<u16>,

        /// Address to bind (default 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Public base URL used to build shareable file links
        #[arg(long)]
        public_url: Option<String>,

        /// Allowed CORS origin; repeat for several. All origins when omitted
        #[arg(long = "cors-origin", value_name = "ORIGIN")]
        cors_origins: Vec<String>,

        /// Do not install SteamCMD at startup when it is missing
        #[arg(long)]
        no_install: bool,
    },

    /// Download one app in the terminal
    Fetch {
        /// App ID or store URL (e.g. 740 or https://store.steampowered.com/app/740/)
        target: String,

        /// Force anonymous login even when a username is configured
        #[arg(long)]
        anonymous: bool,

        /// Steam account name; the password is read from STEAMFETCH_PASSWORD
        /// or prompted for
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Manage the SteamCMD installation
    Steamcmd {
        #[command(subcommand)]
        command: SteamCmdCommand,
    },

    /// Show the resolved directory layout
    Paths,
}
