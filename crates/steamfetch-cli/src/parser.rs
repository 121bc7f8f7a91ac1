//! Top-level CLI parser.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the steamfetch download manager.
#[derive(Parser)]
#[command(name = "steamfetch")]
#[command(about = "Download Steam content through SteamCMD", version)]
pub struct Cli {
    /// Override the data directory for this invocation
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_args_apply_to_subcommands() {
        let cli = Cli::parse_from(["steamfetch", "--verbose", "--data-dir", "/srv/sf", "paths"]);
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/srv/sf")));
    }

    #[test]
    fn fetch_accepts_target_and_login_flags() {
        let cli = Cli::parse_from(["steamfetch", "fetch", "740", "--username", "alice"]);
        match cli.command {
            Some(Commands::Fetch { target, username, anonymous }) => {
                assert_eq!(target, "740");
                assert_eq!(username.as_deref(), Some("alice"));
                assert!(!anonymous);
            }
            _ => panic!("expected fetch command"),
        }
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::parse_from([
            "steamfetch",
            "serve",
            "--port",
            "8080",
            "--cors-origin",
            "https://a.example",
            "--cors-origin",
            "https://b.example",
        ]);
        match cli.command {
            Some(Commands::Serve { port, cors_origins, .. }) => {
                assert_eq!(port, Some(8080));
                assert_eq!(cors_origins.len(), 2);
            }
            _ => panic!("expected serve command"),
        }
    }
}
