//! Keep/Deny/Allow evaluation.
//!
//! - [`decide`] - accept or reject one cookie
//! - [`explain`] - the same verdict plus the rules responsible
//! - [`wash`] - run a whole store's records through the rules

mod decision;
mod error;
mod wash;

pub use decision::{Decision, Reason, Verdict, decide, explain};
pub use error::EvaluationError;
pub use wash::{Removal, SkippedRecord, WashOutcome, wash};
