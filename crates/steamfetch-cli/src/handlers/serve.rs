//! Serve command handler: run the web UI and HTTP API.

use anyhow::Result;

use steamfetch_axum::{CorsConfig, ServerConfig, start_server};

use crate::bootstrap::CliContext;

/// Start the web server and block until the process is stopped.
pub async fn execute(ctx: CliContext, cors_origins: Vec<String>, install_steamcmd: bool) -> Result<()> {
    let mut config = ServerConfig::from_settings(ctx.settings);
    config.install_steamcmd = install_steamcmd;
    if !cors_origins.is_empty() {
        config.cors = CorsConfig::AllowOrigins(cors_origins);
    }

    println!(
        "Starting steamfetch on http://{}:{} (Press Ctrl+C to stop)",
        config.host, config.port
    );
    start_server(config).await
}
