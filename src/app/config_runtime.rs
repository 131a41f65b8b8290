//! Merges CLI arguments, environment toggles and the config file into the
//! settings a run uses.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use washcookies_core::StoreKind;
use washcookies_core::store::default_cookie_db_candidates;

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::{Cli, WashArgs};

/// Name of the rule file looked up in the home directory.
pub(crate) const DEFAULT_RULES_FILE: &str = ".cookierc";

/// Which arguments the user set explicitly, on the command line or through
/// their environment variable.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
    pub(crate) dry_run: bool,
    pub(crate) explain: bool,
}

/// One store selected for washing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoreTarget {
    pub(crate) kind: StoreKind,
    pub(crate) path: PathBuf,
}

/// Effective settings for a run.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) rules_file: PathBuf,
    /// The rule file came from `--rules` or the config file.
    pub(crate) rules_explicit: bool,
    pub(crate) stores: Vec<StoreTarget>,
    pub(crate) dry_run: bool,
    pub(crate) explain: bool,
    pub(crate) json: bool,
    pub(crate) verbose: u8,
    pub(crate) quiet: bool,
    pub(crate) debug: bool,
    pub(crate) no_color: bool,
}

pub(crate) fn parse_cli_with_sources() -> (Cli, CliValueSources) {
    let command = Cli::command();
    let matches = command.get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    (cli, value_sources(&matches))
}

fn value_sources(matches: &ArgMatches) -> CliValueSources {
    CliValueSources {
        verbose: is_explicit_value(matches, "verbose"),
        quiet: is_explicit_value(matches, "quiet"),
        dry_run: is_explicit_value(matches, "dry_run"),
        explain: is_explicit_value(matches, "explain"),
    }
}

/// Global arguments may sit after the subcommand, so look there too.
/// Subcommands only know the global ids.
fn is_explicit_value(matches: &ArgMatches, id: &str) -> bool {
    let explicit = |m: &ArgMatches| {
        m.ids().any(|known| known.as_str() == id)
            && matches!(
                m.value_source(id),
                Some(ValueSource::CommandLine | ValueSource::EnvVariable)
            )
    };
    explicit(matches)
        || matches
            .subcommand()
            .is_some_and(|(_, sub_matches)| explicit(sub_matches))
}

/// Builds run settings: CLI and environment first, then the config file,
/// then built-in defaults.
pub(crate) fn resolve_settings(
    args: &WashArgs,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
    home: Option<&Path>,
) -> Result<Settings> {
    let mut settings = Settings {
        rules_file: PathBuf::new(),
        rules_explicit: false,
        stores: Vec::new(),
        dry_run: args.dry_run,
        explain: args.explain,
        json: args.json,
        verbose: args.verbose,
        quiet: args.quiet,
        debug: false,
        no_color: args.no_color,
    };

    let config_rules = file_config.and_then(|cfg| cfg.rules_file.clone());
    match (&args.rules, config_rules) {
        (Some(path), _) => {
            settings.rules_file = path.clone();
            settings.rules_explicit = true;
        }
        (None, Some(path)) => {
            settings.rules_file = path;
            settings.rules_explicit = true;
        }
        (None, None) => {
            let Some(home) = home else {
                bail!("Cannot locate ~/{DEFAULT_RULES_FILE}: HOME is not set. Pass --rules <PATH>");
            };
            settings.rules_file = home.join(DEFAULT_RULES_FILE);
        }
    }

    if let Some(file_config) = file_config {
        if !cli_sources.dry_run
            && let Some(dry_run) = file_config.dry_run
        {
            settings.dry_run = dry_run;
        }

        if !cli_sources.explain
            && let Some(explain) = file_config.explain
        {
            settings.explain = explain;
        }

        if !cli_sources.verbose
            && !cli_sources.quiet
            && let Some(verbosity) = file_config.verbosity
        {
            apply_config_verbosity(&mut settings, verbosity);
        }
    }

    settings.stores = select_stores(args, file_config, home);
    Ok(settings)
}

/// CLI stores win over config stores; with neither, the default Chrome
/// profile database is used when it exists.
fn select_stores(
    args: &WashArgs,
    file_config: Option<&FileConfig>,
    home: Option<&Path>,
) -> Vec<StoreTarget> {
    let targets = |cookie_files: &[PathBuf], chrome_dbs: &[PathBuf]| {
        cookie_files
            .iter()
            .map(|path| StoreTarget {
                kind: StoreKind::Netscape,
                path: path.clone(),
            })
            .chain(chrome_dbs.iter().map(|path| StoreTarget {
                kind: StoreKind::Chrome,
                path: path.clone(),
            }))
            .collect::<Vec<_>>()
    };

    let from_cli = targets(&args.cookie_files, &args.chrome_dbs);
    if !from_cli.is_empty() {
        return from_cli;
    }
    if let Some(file_config) = file_config {
        let from_config = targets(&file_config.cookie_files, &file_config.chrome_dbs);
        if !from_config.is_empty() {
            return from_config;
        }
    }
    home.map(default_cookie_db_candidates)
        .unwrap_or_default()
        .into_iter()
        .find(|path| path.is_file())
        .map(|path| StoreTarget {
            kind: StoreKind::Chrome,
            path,
        })
        .into_iter()
        .collect()
}

fn apply_config_verbosity(settings: &mut Settings, verbosity: VerbositySetting) {
    let (verbose, quiet, debug) = match verbosity {
        VerbositySetting::Default => (0, false, false),
        VerbositySetting::Verbose => (1, false, false),
        VerbositySetting::Quiet => (0, true, false),
        VerbositySetting::Debug => (0, false, true),
    };
    settings.verbose = verbose;
    settings.quiet = quiet;
    settings.debug = debug;
}

pub(crate) fn resolve_default_log_level(settings: &Settings) -> &'static str {
    if settings.quiet {
        "error"
    } else if settings.debug {
        "trace"
    } else {
        match settings.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}

pub(crate) fn verbosity_label(settings: &Settings) -> &'static str {
    if settings.debug || settings.verbose > 1 {
        VerbositySetting::Debug.as_str()
    } else if settings.quiet {
        VerbositySetting::Quiet.as_str()
    } else if settings.verbose == 1 {
        VerbositySetting::Verbose.as_str()
    } else {
        VerbositySetting::Default.as_str()
    }
}
