//! One evaluation pass over the records of a store.

use tracing::{debug, warn};

use super::decision::{Decision, explain};
use super::error::EvaluationError;
use crate::rules::RuleSet;
use crate::store::CookieRecord;

/// A rejected record and why.
#[derive(Debug, Clone)]
pub struct Removal<'r> {
    /// 1-based position in the store.
    pub position: usize,
    pub record: CookieRecord,
    pub decision: Decision<'r>,
}

/// A record that could not be evaluated. It stays in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// 1-based position in the store.
    pub position: usize,
    pub error: EvaluationError,
}

/// Records partitioned by the pass.
#[derive(Debug, Clone, Default)]
pub struct WashOutcome<'r> {
    /// Accepted and skipped records, in store order.
    pub retained: Vec<CookieRecord>,
    pub removed: Vec<Removal<'r>>,
    pub skipped: Vec<SkippedRecord>,
}

impl WashOutcome<'_> {
    /// True when nothing was removed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.removed.is_empty()
    }
}

/// Evaluates every record against `rules`.
///
/// Unusable records are not evaluated; they are reported in `skipped` and
/// kept.
#[must_use]
pub fn wash(records: Vec<CookieRecord>, rules: &RuleSet) -> WashOutcome<'_> {
    let mut outcome = WashOutcome::default();

    for (index, record) in records.into_iter().enumerate() {
        let position = index + 1;
        if !record.is_usable() {
            let error = EvaluationError::UnusableRecord { position };
            warn!(position, "skipping unusable cookie record");
            outcome.skipped.push(SkippedRecord { position, error });
            outcome.retained.push(record);
            continue;
        }

        let decision = explain(&record, rules);
        if decision.is_accepted() {
            outcome.retained.push(record);
        } else {
            debug!(
                position,
                domain = record.domain.as_deref().unwrap_or_default(),
                name = record.name.as_deref().unwrap_or_default(),
                reason = decision.reason.label(),
                "cookie rejected"
            );
            outcome.removed.push(Removal {
                position,
                record,
                decision,
            });
        }
    }

    outcome
}
