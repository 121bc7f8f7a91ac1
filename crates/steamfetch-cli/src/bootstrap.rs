//! CLI bootstrap - the composition root.
//!
//! Settings are layered here, once: environment (after `dotenv`), then
//! command-line overrides. Handlers receive the result through
//! [`CliContext`] and never read the environment themselves.

use anyhow::Result;

use steamfetch_core::Settings;
use steamfetch_core::paths::DataLayout;

/// Everything a command handler needs.
pub struct CliContext {
    pub settings: Settings,
    pub layout: DataLayout,
}

/// Merge the environment layer with CLI overrides and prepare the
/// directory layout. An unusable data directory is the one fatal
/// misconfiguration.
pub fn bootstrap(overrides: Settings) -> Result<CliContext> {
    let mut settings = Settings::from_env();
    settings.merge(overrides);

    let layout = settings.layout()?;
    layout.ensure_all()?;

    Ok(CliContext { settings, layout })
}
