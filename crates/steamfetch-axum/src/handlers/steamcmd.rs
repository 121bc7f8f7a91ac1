//! SteamCMD installation status.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use steamfetch_runtime::steamcmd;

use crate::state::AppState;

/// Install state of the SteamCMD toolchain.
#[derive(Debug, Serialize)]
pub struct SteamCmdStatus {
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
}

/// `GET /api/steamcmd`
pub async fn status(State(state): State<AppState>) -> Json<SteamCmdStatus> {
    match steamcmd::resolve(&state.layout, state.settings.steamcmd_path.as_deref()) {
        Ok(info) => Json(SteamCmdStatus {
            installed: true,
            path: Some(info.path.display().to_string()),
            source: Some(info.source.as_str()),
        }),
        Err(_) => Json(SteamCmdStatus {
            installed: false,
            path: None,
            source: None,
        }),
    }
}
