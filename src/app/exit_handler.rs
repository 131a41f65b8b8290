//! Exit code logic for the washcookies process.
//!
//! Single responsibility: map per-store results to the process exit outcome.

use crate::ProcessExit;

/// Determines the process exit outcome from store counts.
///
/// `washed` stores completed, `failed` stores errored, and `skipped_records`
/// counts records left unevaluated across all stores.
pub(crate) fn determine_exit_outcome(
    washed: usize,
    failed: usize,
    skipped_records: usize,
) -> ProcessExit {
    if failed == 0 && skipped_records == 0 {
        ProcessExit::Success
    } else if washed > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::determine_exit_outcome;
    use crate::ProcessExit;

    #[test]
    fn test_exit_outcome_success_when_no_failures() {
        assert_eq!(determine_exit_outcome(2, 0, 0), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_success_when_nothing_selected() {
        assert_eq!(determine_exit_outcome(0, 0, 0), ProcessExit::Success);
    }

    #[test]
    fn test_exit_outcome_partial_when_mixed() {
        assert_eq!(determine_exit_outcome(1, 1, 0), ProcessExit::Partial);
    }

    #[test]
    fn test_exit_outcome_partial_when_records_skipped() {
        assert_eq!(determine_exit_outcome(1, 0, 3), ProcessExit::Partial);
    }

    #[test]
    fn test_exit_outcome_failure_when_all_failed() {
        assert_eq!(determine_exit_outcome(0, 2, 0), ProcessExit::Failure);
    }
}
