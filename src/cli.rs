//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0 = every selected store was washed
  1 = partial success (a store failed or some records were skipped)
  2 = complete failure or fatal error";

/// Remove unwanted browser cookies.
///
/// Washcookies checks every stored cookie against the Allow/Deny/Keep rules
/// in ~/.cookierc and rewrites the store without the cookies they reject.
#[derive(Parser, Debug)]
#[command(name = "washcookies")]
#[command(author, version, about)]
#[command(after_help = EXIT_CODES_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub wash: WashArgs,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Parse the rule file and print every rule in normalized form
    Check,
    /// Show the effective configuration
    Config,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WashArgs {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Rule file to use instead of ~/.cookierc
    #[arg(short = 'r', long = "rules", value_name = "PATH", global = true)]
    pub rules: Option<PathBuf>,

    /// Netscape cookies.txt file to wash (repeatable)
    #[arg(long = "cookies", value_name = "PATH")]
    pub cookie_files: Vec<PathBuf>,

    /// Chrome cookie database to wash (repeatable)
    #[arg(long = "chrome", value_name = "PATH")]
    pub chrome_dbs: Vec<PathBuf>,

    /// Report what would be removed without writing anything
    #[arg(short = 'n', long, env = "WC_DRY_RUN", value_parser = FalseyValueParser::new())]
    pub dry_run: bool,

    /// Show which rule rejected each removed cookie
    #[arg(short, long, env = "WC_EXPLAIN", value_parser = FalseyValueParser::new())]
    pub explain: bool,

    /// Print one JSON summary per store on stdout
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let cli = Cli::try_parse_from(["washcookies"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.wash.verbose, 0);
        assert!(!cli.wash.quiet);
        assert!(cli.wash.rules.is_none());
        assert!(cli.wash.cookie_files.is_empty());
        assert!(!cli.wash.json);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let cli = Cli::try_parse_from(["washcookies", "-vv"]).unwrap();
        assert_eq!(cli.wash.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let cli = Cli::try_parse_from(["washcookies", "--quiet"]).unwrap();
        assert!(cli.wash.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Cli::try_parse_from(["washcookies", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Cli::try_parse_from(["washcookies", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = Cli::try_parse_from(["washcookies", "--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_rules_short_and_long() {
        let cli = Cli::try_parse_from(["washcookies", "-r", "/tmp/rules"]).unwrap();
        assert_eq!(cli.wash.rules, Some(PathBuf::from("/tmp/rules")));
        let cli = Cli::try_parse_from(["washcookies", "--rules", "/tmp/other"]).unwrap();
        assert_eq!(cli.wash.rules, Some(PathBuf::from("/tmp/other")));
    }

    #[test]
    fn test_cli_stores_are_repeatable() {
        let cli = Cli::try_parse_from([
            "washcookies",
            "--cookies",
            "a.txt",
            "--cookies",
            "b.txt",
            "--chrome",
            "Cookies",
        ])
        .unwrap();
        assert_eq!(
            cli.wash.cookie_files,
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
        assert_eq!(cli.wash.chrome_dbs, vec![PathBuf::from("Cookies")]);
    }

    #[test]
    fn test_cli_dry_run_and_explain_flags() {
        let cli = Cli::try_parse_from(["washcookies", "-n", "-e", "--json"]).unwrap();
        assert!(cli.wash.dry_run);
        assert!(cli.wash.explain);
        assert!(cli.wash.json);
    }

    #[test]
    fn test_cli_check_subcommand_accepts_global_rules() {
        let cli = Cli::try_parse_from(["washcookies", "check", "--rules", "r.txt"]).unwrap();
        assert_eq!(cli.command, Some(Command::Check));
        assert_eq!(cli.wash.rules, Some(PathBuf::from("r.txt")));
    }

    #[test]
    fn test_cli_config_subcommand() {
        let cli = Cli::try_parse_from(["washcookies", "config"]).unwrap();
        assert_eq!(cli.command, Some(Command::Config));
    }

    #[test]
    fn test_cli_dry_run_value_rejected_on_command_line() {
        let result = Cli::try_parse_from(["washcookies", "--dry-run=maybe"]);
        assert!(result.is_err());
    }
}
