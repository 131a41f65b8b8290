//! Washcookies Core Library
//!
//! This library provides the rule language and evaluation engine behind the
//! `washcookies` tool, which prunes a user's stored browser cookies down to
//! the ones a small set of Allow/Deny/Keep rules says to keep.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`rules`] - Rule-line grammar: criteria, rules and rule sets
//! - [`engine`] - Keep/Deny/Allow decision engine and the wash pass over a store
//! - [`store`] - Cookie records and the store adapters (Netscape file, Chrome `SQLite`)
//! - [`report`] - Human and JSON summaries of a wash pass
//!
//! # Example
//!
//! ```
//! use washcookies_core::{CookieRecord, RuleSet, Verdict, decide};
//!
//! let rules: RuleSet = "+ .banksite.com\n- name~^__utm[abvz]$".parse().unwrap();
//! let cookie = CookieRecord::empty()
//!     .with_domain("secure.banksite.com")
//!     .with_name("session");
//! assert_eq!(decide(&cookie, &rules), Verdict::Accept);
//! ```

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod report;
pub mod rules;
pub mod store;

// Re-export commonly used types
pub use engine::{
    Decision, EvaluationError, Reason, Removal, SkippedRecord, Verdict, WashOutcome, decide,
    explain, wash,
};
pub use report::{SummaryOptions, json_report, write_summary};
pub use rules::{Criterion, Disposition, Field, Operator, Rule, RuleEntry, RuleError, RuleSet};
pub use store::{
    ChromeCookieStore, CookieRecord, CookieStore, NetscapeCookieFile, RecordSource, StoreError,
    StoreKind,
};
