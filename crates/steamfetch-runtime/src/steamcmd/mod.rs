//! SteamCMD toolchain management.
//!
//! Resolution order: explicit override from settings, then the managed
//! installation under the data directory, then the system PATH.

pub mod contract;
mod install;
mod invocation;
mod login;

pub use install::{InstallOutcome, InstallProgress, archive_url, install, install_with_progress};
pub use invocation::SteamCmdInvocation;
pub use login::validate_credentials;

use std::path::{Path, PathBuf};

use steamfetch_core::paths::DataLayout;

use crate::error::{SteamCmdError, SteamCmdResult};

/// Platform-specific name of the SteamCMD entry point.
#[must_use]
pub const fn binary_name() -> &'static str {
    if cfg!(windows) { "steamcmd.exe" } else { "steamcmd.sh" }
}

/// Where a resolved binary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteamCmdSource {
    /// Explicit override from settings.
    Override,
    /// Managed installation under the data directory.
    Managed,
    /// Found on the system PATH.
    SystemPath,
}

impl SteamCmdSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Managed => "managed",
            Self::SystemPath => "system_path",
        }
    }
}

/// A usable SteamCMD binary.
#[derive(Debug, Clone)]
pub struct SteamCmdInfo {
    pub path: PathBuf,
    pub source: SteamCmdSource,
}

/// Resolve the SteamCMD binary without installing anything.
pub fn resolve(layout: &DataLayout, override_path: Option<&Path>) -> SteamCmdResult<SteamCmdInfo> {
    if let Some(path) = override_path {
        verify_executable(path)?;
        return Ok(SteamCmdInfo {
            path: path.to_path_buf(),
            source: SteamCmdSource::Override,
        });
    }

    let managed = layout.steamcmd_dir().join(binary_name());
    if managed.exists() {
        verify_executable(&managed)?;
        return Ok(SteamCmdInfo {
            path: managed,
            source: SteamCmdSource::Managed,
        });
    }

    // Distribution packages install it as plain `steamcmd`.
    if let Ok(found) = which::which("steamcmd") {
        return Ok(SteamCmdInfo {
            path: found,
            source: SteamCmdSource::SystemPath,
        });
    }

    Err(SteamCmdError::NotInstalled)
}

/// Resolve SteamCMD, installing the managed copy when nothing is found.
pub async fn ensure_installed(
    layout: &DataLayout,
    override_path: Option<&Path>,
) -> SteamCmdResult<SteamCmdInfo> {
    match resolve(layout, override_path) {
        Ok(info) => Ok(info),
        Err(SteamCmdError::NotInstalled) => {
            install(layout, false).await?;
            resolve(layout, override_path)
        }
        Err(err) => Err(err),
    }
}

fn verify_executable(path: &Path) -> SteamCmdResult<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let executable = std::fs::metadata(path)
            .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
            .unwrap_or(false);
        if !executable {
            return Err(SteamCmdError::NotExecutable {
                path: path.to_path_buf(),
            });
        }
    }
    #[cfg(not(unix))]
    {
        if !path.is_file() {
            return Err(SteamCmdError::NotExecutable {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn make_executable(path: &Path) {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(path, perms).unwrap();
    }

    #[test]
    fn binary_name_matches_the_platform() {
        if cfg!(windows) {
            assert_eq!(binary_name(), "steamcmd.exe");
        } else {
            assert_eq!(binary_name(), "steamcmd.sh");
        }
    }

    #[cfg(unix)]
    #[test]
    fn override_wins_over_everything() {
        let tmp = TempDir::new().unwrap();
        let custom = tmp.path().join("my-steamcmd");
        std::fs::write(&custom, b"#!/bin/sh\n").unwrap();
        make_executable(&custom);

        let layout = DataLayout::new(tmp.path().join("data"));
        let info = resolve(&layout, Some(&custom)).unwrap();
        assert_eq!(info.source, SteamCmdSource::Override);
        assert_eq!(info.path, custom);
    }

    #[cfg(unix)]
    #[test]
    fn missing_override_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let layout = DataLayout::new(tmp.path());
        let err = resolve(&layout, Some(Path::new("/does/not/exist"))).unwrap_err();
        assert!(matches!(err, SteamCmdError::NotExecutable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_override_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let custom = tmp.path().join("steamcmd.sh");
        std::fs::write(&custom, b"#!/bin/sh\n").unwrap();

        let layout = DataLayout::new(tmp.path().join("data"));
        let err = resolve(&layout, Some(&custom)).unwrap_err();
        assert!(matches!(err, SteamCmdError::NotExecutable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn managed_installation_is_found() {
        let tmp = TempDir::new().unwrap();
        let layout = DataLayout::new(tmp.path());
        std::fs::create_dir_all(layout.steamcmd_dir()).unwrap();
        let managed = layout.steamcmd_dir().join(binary_name());
        std::fs::write(&managed, b"#!/bin/sh\n").unwrap();
        make_executable(&managed);

        let info = resolve(&layout, None).unwrap();
        assert_eq!(info.source, SteamCmdSource::Managed);
        assert_eq!(info.path, managed);
    }
}
