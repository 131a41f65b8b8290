use anyhow::Result;
use tracing::debug;

use crate::app::{command_dispatcher, config_manager, config_runtime, terminal};
use crate::{ProcessExit, commands};

pub(crate) async fn run_washcookies() -> Result<ProcessExit> {
    let (cli, cli_sources) = config_runtime::parse_cli_with_sources();
    let resolved = config_manager::resolve_config(&cli, &cli_sources)?;

    let default_level = config_runtime::resolve_default_log_level(&resolved.settings);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(&cli_sources);
    let no_color = terminal::is_no_color_requested(&resolved.settings);
    terminal::init_tracing(default_level, force_cli_log_level, no_color);

    debug!(?cli, "CLI arguments parsed");

    if let Some(exit) = command_dispatcher::try_dispatch(&cli, &resolved)? {
        return Ok(exit);
    }

    commands::run_wash_command(&resolved.settings).await
}
