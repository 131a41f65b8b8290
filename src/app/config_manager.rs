//! Configuration lifecycle: load file config and merge CLI overrides.

use anyhow::Result;

use crate::app::config_runtime::{self, CliValueSources, Settings};
use crate::app_config::{LoadedConfig, home_dir, load_default_file_config};
use crate::cli::Cli;

/// Settings for this run plus where they came from.
pub(crate) struct ResolvedConfig {
    pub(crate) settings: Settings,
    pub(crate) loaded: LoadedConfig,
}

/// Loads the config file and merges CLI and environment overrides into it.
pub(crate) fn resolve_config(cli: &Cli, cli_sources: &CliValueSources) -> Result<ResolvedConfig> {
    let loaded = load_default_file_config()?;
    let settings = config_runtime::resolve_settings(
        &cli.wash,
        cli_sources,
        loaded.config.as_ref(),
        home_dir().as_deref(),
    )?;
    Ok(ResolvedConfig { settings, loaded })
}
