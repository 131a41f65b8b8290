//! Error types for rule parsing.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building rules from rule-file text.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A rule line violates the grammar.
    #[error("malformed rule{location}: {reason} (in '{text}')\n  Suggestion: {suggestion}")]
    MalformedRule {
        /// The offending rule text (trimmed).
        text: String,
        /// 1-based line in the rule file, when known.
        location: LineRef,
        /// What was wrong.
        reason: String,
        /// How to fix it.
        suggestion: String,
    },

    /// The rule file could not be read.
    #[error("failed to read rule file '{}': {source}", path.display())]
    Io {
        /// Path of the rule file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Optional line reference rendered as ` on line N`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineRef(pub Option<usize>);

impl fmt::Display for LineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(line) => write!(f, " on line {line}"),
            None => Ok(()),
        }
    }
}

impl RuleError {
    fn malformed(text: &str, reason: String, suggestion: &str) -> Self {
        Self::MalformedRule {
            text: text.to_string(),
            location: LineRef::default(),
            reason,
            suggestion: suggestion.to_string(),
        }
    }

    /// Creates a `MalformedRule` error for an empty rule line.
    #[must_use]
    pub fn empty(text: &str) -> Self {
        Self::malformed(
            text,
            "rule line is empty".to_string(),
            "Start the line with +, - or ! followed by at least one criterion",
        )
    }

    /// Creates a `MalformedRule` error for an unknown disposition marker.
    #[must_use]
    pub fn bad_marker(text: &str, marker: char) -> Self {
        Self::malformed(
            text,
            format!("'{marker}' is not a rule marker"),
            "Use + (allow), - (deny) or ! (keep) as the first character",
        )
    }

    /// Creates a `MalformedRule` error for a marker with nothing after it.
    #[must_use]
    pub fn no_criteria(text: &str) -> Self {
        Self::malformed(
            text,
            "rule has no criteria".to_string(),
            "Follow the marker with a separator and at least one criterion, e.g. '+ .example.com'",
        )
    }

    /// Creates a `MalformedRule` error for a negation not followed by an operator.
    #[must_use]
    pub fn unknown_operator(text: &str, clause: &str) -> Self {
        Self::malformed(
            text,
            format!("criterion '{clause}' has no recognized operator"),
            "Operators are = ? ~ @, optionally prefixed with ! to negate",
        )
    }

    /// Creates a `MalformedRule` error for an unknown field name.
    #[must_use]
    pub fn unknown_field(text: &str, key: &str) -> Self {
        Self::malformed(
            text,
            format!("'{key}' is not a cookie field"),
            "Fields are domain, path, name, value and httponly",
        )
    }

    /// Creates a `MalformedRule` error for an empty criterion.
    #[must_use]
    pub fn missing_argument(text: &str) -> Self {
        Self::malformed(
            text,
            "empty criterion (missing argument)".to_string(),
            "Check for doubled separators; write domain@ to match an empty domain",
        )
    }

    /// Creates a `MalformedRule` error for a `~` pattern that does not compile.
    #[must_use]
    pub fn invalid_regex(text: &str, pattern: &str, error: &regex::Error) -> Self {
        let detail = error.to_string();
        let summary = detail.lines().last().unwrap_or_default().trim();
        Self::malformed(
            text,
            format!("invalid regular expression '{pattern}': {summary}"),
            "Fix the pattern; ~ uses Rust regex syntax (unanchored search)",
        )
    }

    /// Attaches a 1-based rule-file line number to a `MalformedRule` error.
    #[must_use]
    pub fn at_line(self, line_number: usize) -> Self {
        match self {
            Self::MalformedRule {
                text,
                reason,
                suggestion,
                ..
            } => Self::MalformedRule {
                text,
                location: LineRef(Some(line_number)),
                reason,
                suggestion,
            },
            other => other,
        }
    }

    /// Returns the rule-file line number, if this error carries one.
    #[must_use]
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Self::MalformedRule { location, .. } => location.0,
            Self::Io { .. } => None,
        }
    }
}
