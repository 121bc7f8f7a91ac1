//! Route definitions and router construction.
//!
//! Uses axum 0.8 path syntax: `{param}` instead of the old `:param`.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AppContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            let parsed = origins.iter().filter_map(|o| o.parse().ok()).collect::<Vec<_>>();
            CorsLayer::new()
                .allow_origin(parsed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// API routes without the `/api` prefix (nested by [`create_router`]).
pub(crate) fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/job", get(handlers::job::status).post(handlers::job::submit))
        .route("/job/cancel", post(handlers::job::cancel))
        .route("/job/logs", get(handlers::job::logs))
        .route("/steamcmd", get(handlers::steamcmd::status))
        .route("/files/{app_id}", get(handlers::files::list))
        .route("/events", get(handlers::events::stream))
}

/// Create the main router: embedded UI, API, and downloaded-file serving.
pub fn create_router(context: AppContext, cors_config: &CorsConfig) -> Router {
    let downloads_dir = context.layout.downloads_dir();
    let state: AppState = Arc::new(context);
    let cors = build_cors_layer(cors_config);

    Router::new()
        .route("/", get(handlers::ui::index))
        .route("/health", get(health_check))
        .nest("/api", api_routes().with_state(state).layer(cors))
        .nest_service("/files", ServeDir::new(downloads_dir))
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
