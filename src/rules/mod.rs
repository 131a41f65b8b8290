//! Rule language for cookie filtering.
//!
//! A rule file holds one rule per line. Each rule starts with a disposition
//! marker (`+` allow, `-` deny, `!` keep); the character right after the
//! marker is the separator for the rest of the line, and every piece between
//! separators is one criterion:
//!
//! ```text
//! + .banksite.com                          accept anything under banksite.com
//! - name~^__utm[abvz]$                     drop Google Analytics cookies
//! + .somehost.com domain!=foo.somehost.com  somehost.com, except foo
//! ! value=SaveMe                           never drop these
//! -|path~^/ads|httponly?                    any separator works
//! ```
//!
//! A criterion is `[key][!]op[arg]`. Keys are `domain`, `path`, `name`,
//! `value` and `httponly`; operators are `=` (case-insensitive equality),
//! `?` (field exists), `~` (regex search) and `@` (domain match, where a
//! leading `.` matches the domain and any subdomain). A bare argument means
//! `domain@arg`.
//!
//! # Example
//!
//! ```
//! use washcookies_core::rules::{Disposition, Rule};
//!
//! let rule = Rule::parse("- name~^__utm[abvz]$").unwrap();
//! assert_eq!(rule.disposition(), Disposition::Deny);
//! assert_eq!(rule.criteria().len(), 1);
//! ```

mod criterion;
mod error;
mod rule;
mod ruleset;

pub use criterion::{Criterion, Field, Operator};
pub use error::{LineRef, RuleError};
pub use rule::{Disposition, Rule};
pub use ruleset::{DispositionCounts, RuleEntry, RuleSet};
