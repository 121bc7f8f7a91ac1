//! Web server bootstrap - the composition root for the Axum adapter.
//!
//! Wires together, in order: the directory layout, the SteamCMD toolchain
//! check, the job manager, and the SSE broadcaster. Handlers receive all of
//! it through [`AppContext`]; nothing is process-global.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;

use steamfetch_core::Settings;
use steamfetch_core::paths::DataLayout;
use steamfetch_runtime::{JobManager, steamcmd};

use crate::sse::SseBroadcaster;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow any origin. Fine for a LAN tool, tighten for anything public.
    #[default]
    AllowAll,
    /// Allow only the listed origins.
    AllowOrigins(Vec<String>),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub settings: Settings,
    pub cors: CorsConfig,
    /// Install SteamCMD at startup when nothing is found.
    pub install_steamcmd: bool,
}

impl ServerConfig {
    /// Build a config from fully merged settings.
    #[must_use]
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            host: settings.effective_host(),
            port: settings.effective_port(),
            settings,
            cors: CorsConfig::default(),
            install_steamcmd: true,
        }
    }
}

/// Application context shared by all handlers.
pub struct AppContext {
    /// Job launcher, monitor, and state owner.
    pub jobs: Arc<JobManager>,
    /// SSE fan-out over the manager's event channel.
    pub sse: Arc<SseBroadcaster>,
    /// Resolved settings.
    pub settings: Settings,
    /// Directory layout in use.
    pub layout: DataLayout,
}

/// Build the application context.
///
/// Fails only on unrecoverable misconfiguration (unusable data directory).
/// A missing SteamCMD is reported but not fatal; submissions will return a
/// configuration error until it is installed.
pub async fn bootstrap(config: &ServerConfig) -> Result<AppContext> {
    // 1. Directory layout
    let layout = config.settings.layout()?;
    layout.ensure_all()?;
    tracing::info!(data_dir = %layout.data_dir().display(), "directory layout ready");

    // 2. SteamCMD toolchain
    if config.install_steamcmd {
        match steamcmd::ensure_installed(&layout, config.settings.steamcmd_path.as_deref()).await {
            Ok(info) => {
                tracing::info!(path = %info.path.display(), source = info.source.as_str(), "SteamCMD ready");
            }
            Err(err) => tracing::warn!(error = %err, "SteamCMD not available yet"),
        }
    }

    // 3. Job manager and event fan-out
    let jobs = Arc::new(JobManager::new(
        layout.clone(),
        config.settings.steamcmd_path.clone(),
    ));
    let sse = Arc::new(SseBroadcaster::new(jobs.event_sender()));

    Ok(AppContext {
        jobs,
        sse,
        settings: config.settings.clone(),
        layout,
    })
}

/// Bootstrap and serve until the process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let context = bootstrap(&config).await?;
    let app = crate::routes::create_router(context, &config.cors);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("steamfetch listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
