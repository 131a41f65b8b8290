//! CLI command routing: runs the Check and Config subcommands.
//!
//! If the user invoked a subcommand, this module runs its handler and returns
//! the exit outcome. Otherwise returns `None` so the caller goes on to wash.

use anyhow::Result;

use crate::app::config_manager::ResolvedConfig;
use crate::cli::{Cli, Command};
use crate::{ProcessExit, commands};

/// If `cli` has a subcommand, run it and return `Some(exit)`; otherwise return `None`.
pub(crate) fn try_dispatch(cli: &Cli, resolved: &ResolvedConfig) -> Result<Option<ProcessExit>> {
    let Some(command) = &cli.command else {
        return Ok(None);
    };

    match command {
        Command::Check => commands::run_check_command(&resolved.settings)?,
        Command::Config => commands::run_config_show_command(resolved),
    }

    Ok(Some(ProcessExit::Success))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::try_dispatch;
    use crate::app::config_manager::ResolvedConfig;
    use crate::app::config_runtime::{CliValueSources, resolve_settings};
    use crate::app_config::LoadedConfig;
    use crate::cli::Cli;
    use clap::Parser;

    /// When no subcommand is present, try_dispatch returns None so runtime continues to wash.
    #[test]
    fn test_try_dispatch_returns_none_when_no_command() {
        let cli = Cli::parse_from(["washcookies", "-r", "/tmp/rules"]);
        let settings =
            resolve_settings(&cli.wash, &CliValueSources::default(), None, None).unwrap();
        let resolved = ResolvedConfig {
            settings,
            loaded: LoadedConfig::default(),
        };
        assert_eq!(try_dispatch(&cli, &resolved).unwrap(), None);
    }
}
