//! Error types for the wash pass.

use thiserror::Error;

/// Why a record was left out of evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// The record has none of domain, path, name or value.
    #[error("cookie record #{position} has no domain, path, name or value; keeping it unchanged")]
    UnusableRecord {
        /// 1-based position in the store.
        position: usize,
    },
}
