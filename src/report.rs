//! Summaries of a wash pass.
//!
//! The human summary follows the classic washcookies layout:
//!
//! ```text
//! In '/home/me/.cookies.txt'
//! Removing 2 unwanted cookies:
//!  ■ .doubleclick.net               id=AHWqTUmX3c
//!  □ www.example.org                theme=dark
//! Kept 14 cookies.
//! ```
//!
//! `■` marks a cookie rejected by a Deny rule, `□` one that no Allow rule
//! matched. The JSON summary never includes cookie values.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::engine::{Reason, Removal, WashOutcome};
use crate::store::StoreKind;

/// Switches for [`write_summary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Print the responsible rules under each removed cookie.
    pub explain: bool,
    /// Nothing is written back.
    pub dry_run: bool,
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Writes the human summary for one store.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn write_summary(
    out: &mut impl Write,
    location: &Path,
    outcome: &WashOutcome<'_>,
    options: SummaryOptions,
) -> io::Result<()> {
    writeln!(out, "In '{}'", location.display())?;
    if outcome.is_clean() {
        writeln!(out, "No unwanted cookies found.")?;
        return Ok(());
    }

    let count = outcome.removed.len();
    writeln!(out, "Removing {count} unwanted cookie{}:", plural(count))?;
    for removal in sorted_by_domain(&outcome.removed) {
        let record = &removal.record;
        let tag = match removal.decision.reason {
            Reason::Denied(_) => '■',
            _ => '□',
        };
        let line = format!(
            " {tag} {:<30.30} {}={:<20.20}",
            record.domain.as_deref().unwrap_or_default(),
            record.name.as_deref().unwrap_or_default(),
            record.value().unwrap_or_default(),
        );
        writeln!(out, "{}", line.trim_end())?;

        if options.explain {
            let rules = removal.decision.rules();
            if rules.is_empty() {
                writeln!(out, "   no matching rule")?;
            }
            for entry in rules {
                writeln!(
                    out,
                    "   rejected by line {}: {}",
                    entry.line_number(),
                    entry.rule()
                )?;
            }
        }
    }

    if options.dry_run {
        writeln!(out, "(skipping write)")?;
    } else {
        let kept = outcome.retained.len();
        writeln!(out, "Kept {kept} cookie{}.", plural(kept))?;
    }
    Ok(())
}

fn sorted_by_domain<'a, 'r>(removed: &'a [Removal<'r>]) -> Vec<&'a Removal<'r>> {
    let mut sorted: Vec<&Removal<'r>> = removed.iter().collect();
    sorted.sort_by(|a, b| a.record.domain.cmp(&b.record.domain));
    sorted
}

#[derive(Debug, Serialize)]
struct StoreReport<'a> {
    location: String,
    kind: StoreKind,
    dry_run: bool,
    written: bool,
    kept: usize,
    removed: Vec<RemovedCookie<'a>>,
    skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Serialize)]
struct RemovedCookie<'a> {
    position: usize,
    domain: Option<&'a str>,
    path: Option<&'a str>,
    name: Option<&'a str>,
    httponly: bool,
    reason: &'static str,
    rules: Vec<RuleRef>,
}

#[derive(Debug, Serialize)]
struct RuleRef {
    line: usize,
    rule: String,
}

#[derive(Debug, Serialize)]
struct SkippedEntry {
    position: usize,
    error: String,
}

/// Renders the summary for one store as a single-line JSON object.
///
/// # Errors
///
/// Returns the serialization error, which does not occur for these types in
/// practice.
pub fn json_report(
    location: &Path,
    kind: StoreKind,
    outcome: &WashOutcome<'_>,
    dry_run: bool,
    written: bool,
) -> serde_json::Result<String> {
    let report = StoreReport {
        location: location.display().to_string(),
        kind,
        dry_run,
        written,
        kept: outcome.retained.len(),
        removed: outcome
            .removed
            .iter()
            .map(|removal| RemovedCookie {
                position: removal.position,
                domain: removal.record.domain.as_deref(),
                path: removal.record.path.as_deref(),
                name: removal.record.name.as_deref(),
                httponly: removal.record.httponly,
                reason: removal.decision.reason.label(),
                rules: removal
                    .decision
                    .rules()
                    .iter()
                    .map(|entry| RuleRef {
                        line: entry.line_number(),
                        rule: entry.rule().to_string(),
                    })
                    .collect(),
            })
            .collect(),
        skipped: outcome
            .skipped
            .iter()
            .map(|skipped| SkippedEntry {
                position: skipped.position,
                error: skipped.error.to_string(),
            })
            .collect(),
    };
    serde_json::to_string(&report)
}
