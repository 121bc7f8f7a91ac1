//! SteamCMD management handlers.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use steamfetch_runtime::steamcmd::{self, InstallOutcome};

use crate::bootstrap::CliContext;

/// Install SteamCMD into the managed directory, with a byte progress bar.
pub async fn install(ctx: &CliContext, force: bool) -> Result<()> {
    println!("Fetching {}", steamcmd::archive_url());

    let bar = download_bar();
    let on_progress = |downloaded: u64, total: u64| {
        if total > 0 {
            bar.set_length(total);
        }
        bar.set_position(downloaded);
    };

    let outcome = steamcmd::install_with_progress(&ctx.layout, force, Some(&on_progress)).await?;
    bar.finish_and_clear();

    match outcome {
        InstallOutcome::Installed => {
            println!("SteamCMD installed to {}", ctx.layout.steamcmd_dir().display());
        }
        InstallOutcome::AlreadyInstalled => {
            println!("SteamCMD is already installed (use --force to reinstall)");
        }
    }
    Ok(())
}

/// Report where SteamCMD resolves from, or that it is missing.
pub fn status(ctx: &CliContext) -> Result<()> {
    match steamcmd::resolve(&ctx.layout, ctx.settings.steamcmd_path.as_deref()) {
        Ok(info) => {
            println!("SteamCMD: {} ({})", info.path.display(), info.source.as_str());
        }
        Err(err) => {
            println!("SteamCMD: not available");
            println!("  {err}");
        }
    }
    Ok(())
}

fn download_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
