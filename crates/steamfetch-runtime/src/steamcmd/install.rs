//! SteamCMD installation from Valve's official archives.

use std::io::Write;
use std::path::Path;

use futures_util::StreamExt;

use steamfetch_core::paths::{DataLayout, DirectoryCreationStrategy, ensure_directory};

use super::binary_name;
use crate::error::{SteamCmdError, SteamCmdResult};

/// Byte-progress callback: `(downloaded, total)`. Total is zero when the
/// server sends no content length.
pub type InstallProgress<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

/// Official archive for the current platform.
#[must_use]
pub const fn archive_url() -> &'static str {
    if cfg!(windows) {
        "https://steamcdn-a.akamaihd.net/client/installer/steamcmd.zip"
    } else if cfg!(target_os = "macos") {
        "https://steamcdn-a.akamaihd.net/client/installer/steamcmd_osx.tar.gz"
    } else {
        "https://steamcdn-a.akamaihd.net/client/installer/steamcmd_linux.tar.gz"
    }
}

/// Outcome of an install request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// A fresh copy was downloaded and unpacked.
    Installed,
    /// A managed copy was already present and `force` was not set.
    AlreadyInstalled,
}

/// Download and unpack SteamCMD into the managed directory.
pub async fn install(layout: &DataLayout, force: bool) -> SteamCmdResult<InstallOutcome> {
    install_with_progress(layout, force, None).await
}

/// Install with an optional byte-progress callback.
pub async fn install_with_progress(
    layout: &DataLayout,
    force: bool,
    progress: Option<InstallProgress<'_>>,
) -> SteamCmdResult<InstallOutcome> {
    let steamcmd_dir = layout.steamcmd_dir();
    let binary = steamcmd_dir.join(binary_name());
    if binary.exists() && !force {
        return Ok(InstallOutcome::AlreadyInstalled);
    }

    ensure_directory(&steamcmd_dir, DirectoryCreationStrategy::AutoCreate)?;

    let url = archive_url();
    tracing::info!(url, dir = %steamcmd_dir.display(), "installing SteamCMD");

    let archive_name = url.rsplit('/').next().unwrap_or("steamcmd-archive");
    let archive_path = steamcmd_dir.join(archive_name);
    download_archive(url, &archive_path, progress).await?;

    let unpack_result = unpack_archive(&archive_path, &steamcmd_dir);
    // The archive is transient either way.
    let _ = std::fs::remove_file(&archive_path);
    unpack_result?;

    if !binary.exists() {
        return Err(SteamCmdError::ExtractionFailed(format!(
            "{} missing after unpacking",
            binary.display()
        )));
    }

    #[cfg(unix)]
    set_executable_bits(&steamcmd_dir)?;

    tracing::info!(binary = %binary.display(), "SteamCMD installed");
    Ok(InstallOutcome::Installed)
}

async fn download_archive(
    url: &str,
    dest: &Path,
    progress: Option<InstallProgress<'_>>,
) -> SteamCmdResult<()> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| SteamCmdError::DownloadFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(SteamCmdError::DownloadFailed(format!(
            "HTTP {} from {url}",
            response.status()
        )));
    }

    let total_bytes = response.content_length().unwrap_or(0);
    let mut file = std::fs::File::create(dest)?;
    let mut downloaded: u64 = 0;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| SteamCmdError::DownloadFailed(e.to_string()))?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        if let Some(callback) = progress {
            callback(downloaded, total_bytes);
        }
    }
    file.flush()?;
    Ok(())
}

fn unpack_archive(archive_path: &Path, dest: &Path) -> SteamCmdResult<()> {
    #[cfg(windows)]
    {
        unpack_zip(archive_path, dest)
    }
    #[cfg(not(windows))]
    {
        unpack_tar_gz(archive_path, dest)
    }
}

#[cfg(not(windows))]
fn unpack_tar_gz(archive_path: &Path, dest: &Path) -> SteamCmdResult<()> {
    let file = std::fs::File::open(archive_path)?;
    let decoder = flate2::read::GzDecoder::new(file);
    let mut archive = tar::Archive::new(decoder);
    archive
        .unpack(dest)
        .map_err(|e| SteamCmdError::ExtractionFailed(e.to_string()))
}

#[cfg(windows)]
fn unpack_zip(archive_path: &Path, dest: &Path) -> SteamCmdResult<()> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| SteamCmdError::ExtractionFailed(e.to_string()))?;
    archive
        .extract(dest)
        .map_err(|e| SteamCmdError::ExtractionFailed(e.to_string()))
}

/// Mark the entry point and the platform binary it drives as executable.
/// Valve's tarballs do not always preserve the mode bits.
#[cfg(unix)]
fn set_executable_bits(dir: &Path) -> SteamCmdResult<()> {
    use std::os::unix::fs::PermissionsExt;

    for relative in [binary_name(), "linux32/steamcmd", "osx32/steamcmd"] {
        let path = dir.join(relative);
        if path.exists() {
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn archive_url_points_at_the_steam_cdn() {
        let url = archive_url();
        assert!(url.starts_with("https://steamcdn-a.akamaihd.net/client/installer/"));
    }

    #[tokio::test]
    async fn existing_binary_short_circuits() {
        let tmp = TempDir::new().unwrap();
        let layout = DataLayout::new(tmp.path());
        std::fs::create_dir_all(layout.steamcmd_dir()).unwrap();
        std::fs::write(layout.steamcmd_dir().join(binary_name()), b"#!/bin/sh\n").unwrap();

        let outcome = install(&layout, false).await.unwrap();
        assert_eq!(outcome, InstallOutcome::AlreadyInstalled);
    }

    #[cfg(unix)]
    #[test]
    fn tarball_unpacks_into_the_target_directory() {
        let tmp = TempDir::new().unwrap();
        let archive_path = tmp.path().join("steamcmd_linux.tar.gz");

        // Build a minimal steamcmd-shaped tarball.
        let file = std::fs::File::create(&archive_path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let script = b"#!/bin/sh\nexit 0\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(script.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "steamcmd.sh", script.as_slice())
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let dest = tmp.path().join("unpacked");
        std::fs::create_dir_all(&dest).unwrap();
        unpack_tar_gz(&archive_path, &dest).unwrap();
        assert!(dest.join("steamcmd.sh").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn executable_bits_are_applied() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("steamcmd.sh"), b"#!/bin/sh\n").unwrap();
        set_executable_bits(tmp.path()).unwrap();

        let mode = std::fs::metadata(tmp.path().join("steamcmd.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o755, 0o755);
    }
}
