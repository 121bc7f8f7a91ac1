//! Runtime settings.
//!
//! Settings are resolved in layers: built-in defaults, then environment
//! variables (read after `dotenv`), then explicit command-line overrides.
//! Every field is optional so a partial layer can be merged over another.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::paths::{DataLayout, PathError};

/// Default HTTP port for the web UI.
pub const DEFAULT_PORT: u16 = 7860;

/// Default bind address. Loopback only; expose deliberately.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Environment variable: HTTP port.
pub const ENV_PORT: &str = "STEAMFETCH_PORT";
/// Environment variable: bind address.
pub const ENV_HOST: &str = "STEAMFETCH_HOST";
/// Environment variable: data directory override.
pub const ENV_DATA_DIR: &str = "STEAMFETCH_DATA_DIR";
/// Environment variable: explicit SteamCMD binary path.
pub const ENV_STEAMCMD: &str = "STEAMFETCH_STEAMCMD";
/// Environment variable: public base URL for shareable file links.
pub const ENV_PUBLIC_URL: &str = "STEAMFETCH_PUBLIC_URL";

/// Resolved application settings. `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP port for the web server.
    pub port: Option<u16>,
    /// Bind address for the web server.
    pub host: Option<String>,
    /// Root of the on-disk layout.
    pub data_dir: Option<PathBuf>,
    /// Explicit SteamCMD binary, skipping auto-resolution.
    pub steamcmd_path: Option<PathBuf>,
    /// Externally reachable base URL, used to build file links.
    pub public_url: Option<String>,
}

impl Settings {
    /// Read the environment layer.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: read_env(ENV_PORT).and_then(|v| v.parse().ok()),
            host: read_env(ENV_HOST),
            data_dir: read_env(ENV_DATA_DIR).map(PathBuf::from),
            steamcmd_path: read_env(ENV_STEAMCMD).map(PathBuf::from),
            public_url: read_env(ENV_PUBLIC_URL).map(|v| v.trim_end_matches('/').to_string()),
        }
    }

    /// Port to bind, falling back to [`DEFAULT_PORT`].
    #[must_use]
    pub const fn effective_port(&self) -> u16 {
        match self.port {
            Some(port) => port,
            None => DEFAULT_PORT,
        }
    }

    /// Address to bind, falling back to [`DEFAULT_HOST`].
    #[must_use]
    pub fn effective_host(&self) -> String {
        self.host.clone().unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    /// Resolve the directory layout, falling back to `~/.steamfetch`.
    pub fn layout(&self) -> Result<DataLayout, PathError> {
        match &self.data_dir {
            Some(dir) => Ok(DataLayout::new(dir.clone())),
            None => DataLayout::with_default_root(),
        }
    }

    /// Overlay another settings layer; `Some` fields in `other` win.
    pub fn merge(&mut self, other: Self) {
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.steamcmd_path.is_some() {
            self.steamcmd_path = other.steamcmd_path;
        }
        if other.public_url.is_some() {
            self.public_url = other.public_url;
        }
    }
}

/// Read an environment variable, treating empty values as unset.
fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let settings = Settings::default();
        assert_eq!(settings.effective_port(), DEFAULT_PORT);
        assert_eq!(settings.effective_host(), DEFAULT_HOST);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let settings = Settings {
            port: Some(9000),
            host: Some("0.0.0.0".to_string()),
            ..Settings::default()
        };
        assert_eq!(settings.effective_port(), 9000);
        assert_eq!(settings.effective_host(), "0.0.0.0");
    }

    #[test]
    fn merge_prefers_the_overlay() {
        let mut base = Settings {
            port: Some(7860),
            data_dir: Some(PathBuf::from("/base")),
            ..Settings::default()
        };
        base.merge(Settings {
            port: Some(9000),
            public_url: Some("https://example.net".to_string()),
            ..Settings::default()
        });
        assert_eq!(base.port, Some(9000));
        assert_eq!(base.data_dir, Some(PathBuf::from("/base")));
        assert_eq!(base.public_url.as_deref(), Some("https://example.net"));
    }

    #[test]
    fn explicit_data_dir_feeds_the_layout() {
        let settings = Settings {
            data_dir: Some(PathBuf::from("/srv/steamfetch")),
            ..Settings::default()
        };
        let layout = settings.layout().unwrap();
        assert_eq!(layout.data_dir(), std::path::Path::new("/srv/steamfetch"));
    }

    #[test]
    fn settings_deserialize_from_partial_json() {
        let settings: Settings = serde_json::from_str("{\"port\":8080}").unwrap();
        assert_eq!(settings.port, Some(8080));
        assert_eq!(settings.host, None);
    }
}
