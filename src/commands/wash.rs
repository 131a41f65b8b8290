//! Default command: wash every selected store.

use std::io::{self, ErrorKind, Write};

use anyhow::{Context, Result};
use tracing::{error, info, instrument, warn};
use washcookies_core::{
    ChromeCookieStore, CookieStore, NetscapeCookieFile, RuleError, RuleSet, StoreError, StoreKind,
    SummaryOptions, json_report, wash, write_summary,
};

use crate::ProcessExit;
use crate::app::config_runtime::{Settings, StoreTarget};
use crate::app::exit_handler;

/// Counts from one washed store.
struct StoreResult {
    skipped: usize,
}

pub async fn run_wash_command(settings: &Settings) -> Result<ProcessExit> {
    let Some(rules) = load_rules(settings)? else {
        return Ok(ProcessExit::Success);
    };

    if settings.stores.is_empty() {
        info!("No cookie store found. Pass --cookies <PATH> or --chrome <PATH>.");
        return Ok(ProcessExit::Success);
    }

    let mut washed = 0usize;
    let mut failed = 0usize;
    let mut skipped = 0usize;
    for target in &settings.stores {
        let store = open_store(target);
        match wash_store(store.as_ref(), &rules, settings).await {
            Ok(result) => {
                washed += 1;
                skipped += result.skipped;
            }
            Err(err)
                if err
                    .downcast_ref::<StoreError>()
                    .is_some_and(StoreError::is_not_found) =>
            {
                info!(path = %target.path.display(), "Cookie store not found, skipping");
            }
            Err(err) => {
                error!(path = %target.path.display(), error = %format!("{err:#}"), "Failed to wash cookie store");
                failed += 1;
            }
        }
    }

    info!(washed, failed, skipped, "Wash complete");
    Ok(exit_handler::determine_exit_outcome(washed, failed, skipped))
}

/// `None` when the default rule file does not exist: no policy, touch nothing.
fn load_rules(settings: &Settings) -> Result<Option<RuleSet>> {
    match RuleSet::load(&settings.rules_file) {
        Ok(rules) => {
            let counts = rules.counts();
            info!(
                path = %settings.rules_file.display(),
                allow = counts.allow,
                deny = counts.deny,
                keep = counts.keep,
                "Loaded cookie rules"
            );
            Ok(Some(rules))
        }
        Err(RuleError::Io { source, .. })
            if source.kind() == ErrorKind::NotFound && !settings.rules_explicit =>
        {
            warn!(
                path = %settings.rules_file.display(),
                "No rule file found; leaving cookies untouched"
            );
            Ok(None)
        }
        Err(err) => Err(err).context("Cannot load cookie rules"),
    }
}

fn open_store(target: &StoreTarget) -> Box<dyn CookieStore> {
    match target.kind {
        StoreKind::Netscape => Box::new(NetscapeCookieFile::new(&target.path)),
        StoreKind::Chrome => Box::new(ChromeCookieStore::new(&target.path)),
    }
}

#[instrument(skip_all, fields(store = %store.location().display(), kind = %store.kind()))]
async fn wash_store(
    store: &dyn CookieStore,
    rules: &RuleSet,
    settings: &Settings,
) -> Result<StoreResult> {
    let records = store.load().await?;
    let total = records.len();
    let outcome = wash(records, rules);

    let written = !settings.dry_run && !outcome.is_clean();
    if written {
        store.save(&outcome.retained).await?;
    }
    info!(
        total,
        removed = outcome.removed.len(),
        skipped = outcome.skipped.len(),
        written,
        "Store washed"
    );

    if settings.json {
        let json = json_report(
            store.location(),
            store.kind(),
            &outcome,
            settings.dry_run,
            written,
        )?;
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{json}")?;
    } else if !settings.quiet {
        let options = SummaryOptions {
            explain: settings.explain,
            dry_run: settings.dry_run,
        };
        write_summary(&mut io::stderr().lock(), store.location(), &outcome, options)
            .context("Cannot write summary")?;
    }

    Ok(StoreResult {
        skipped: outcome.skipped.len(),
    })
}
