//! CLI entry point - the composition root.
//!
//! Settings layering happens in `bootstrap`; this file only parses
//! arguments, initializes logging, and dispatches to handlers.

use clap::Parser;

use steamfetch_cli::{Cli, Commands, SteamCmdCommand, bootstrap, handlers};
use steamfetch_core::Settings;

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    let base = Settings {
        data_dir: cli.data_dir,
        ..Settings::default()
    };

    match command {
        Commands::Serve {
            port,
            host,
            public_url,
            cors_origins,
            no_install,
        } => {
            let overrides = Settings {
                port,
                host,
                public_url,
                ..base
            };
            let ctx = bootstrap(overrides)?;
            handlers::serve::execute(ctx, cors_origins, !no_install).await?;
        }
        Commands::Fetch {
            target,
            anonymous,
            username,
        } => {
            let login = handlers::fetch::resolve_login(anonymous, username)?;
            let ctx = bootstrap(base)?;
            handlers::fetch::execute(&ctx, &target, login).await?;
        }
        Commands::Steamcmd { command } => {
            let ctx = bootstrap(base)?;
            match command {
                SteamCmdCommand::Install { force } => {
                    handlers::steamcmd::install(&ctx, force).await?;
                }
                SteamCmdCommand::Status => handlers::steamcmd::status(&ctx)?,
            }
        }
        Commands::Paths => {
            let ctx = bootstrap(base)?;
            handlers::paths::execute(&ctx)?;
        }
    }

    Ok(())
}
