//! Paths command handler.
//!
//! Prints the resolved layout in `key = value` form, the reference tool
//! for "where did my files go" questions.

use anyhow::Result;

use steamfetch_runtime::steamcmd;

use crate::bootstrap::CliContext;

/// Print every directory steamfetch uses, plus the resolved SteamCMD
/// binary when one is available.
pub fn execute(ctx: &CliContext) -> Result<()> {
    let layout = &ctx.layout;
    println!("data_dir      = {}", layout.data_dir().display());
    println!("downloads_dir = {}", layout.downloads_dir().display());
    println!("logs_dir      = {}", layout.logs_dir().display());
    println!("steamcmd_dir  = {}", layout.steamcmd_dir().display());

    match steamcmd::resolve(layout, ctx.settings.steamcmd_path.as_deref()) {
        Ok(info) => println!("steamcmd      = {} ({})", info.path.display(), info.source.as_str()),
        Err(_) => println!("steamcmd      = (not installed)"),
    }
    Ok(())
}
