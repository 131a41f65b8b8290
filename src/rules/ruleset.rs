//! Ordered rule sets loaded from a rule file.

use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, instrument};

use super::error::RuleError;
use super::rule::{Disposition, Rule};

/// A rule together with the rule-file line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEntry {
    line_number: usize,
    rule: Rule,
}

impl RuleEntry {
    /// 1-based line in the source text.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    #[must_use]
    pub fn rule(&self) -> &Rule {
        &self.rule
    }
}

/// Number of rules per disposition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispositionCounts {
    pub allow: usize,
    pub deny: usize,
    pub keep: usize,
}

/// Rules parsed once at startup, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    entries: Vec<RuleEntry>,
}

impl RuleSet {
    /// Builds a rule set from rules, numbering them from 1.
    #[must_use]
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        let entries = rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| RuleEntry {
                line_number: index + 1,
                rule,
            })
            .collect();
        Self { entries }
    }

    /// Parses rule-file text.
    ///
    /// A leading byte-order mark is ignored. Blank lines and lines whose
    /// first non-whitespace character is `#` are skipped. There are no
    /// inline comments.
    ///
    /// # Errors
    ///
    /// Returns the first `RuleError::MalformedRule`, tagged with its line number.
    pub fn parse_str(text: &str) -> Result<Self, RuleError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut entries = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let rule = Rule::parse(trimmed).map_err(|e| e.at_line(line_number))?;
            entries.push(RuleEntry { line_number, rule });
        }
        Ok(Self { entries })
    }

    /// Reads and parses a rule file.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::Io` when the file cannot be read and
    /// `RuleError::MalformedRule` for grammar violations.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, RuleError> {
        let text = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rules = Self::parse_str(&text)?;
        let counts = rules.counts();
        debug!(
            allow = counts.allow,
            deny = counts.deny,
            keep = counts.keep,
            "rule file loaded"
        );
        Ok(rules)
    }

    #[must_use]
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one disposition, in file order.
    pub fn with_disposition(
        &self,
        disposition: Disposition,
    ) -> impl Iterator<Item = &RuleEntry> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.rule.disposition() == disposition)
    }

    #[must_use]
    pub fn counts(&self) -> DispositionCounts {
        self.entries
            .iter()
            .fold(DispositionCounts::default(), |mut counts, entry| {
                match entry.rule.disposition() {
                    Disposition::Allow => counts.allow += 1,
                    Disposition::Deny => counts.deny += 1,
                    Disposition::Keep => counts.keep += 1,
                }
                counts
            })
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RuleEntry;
    type IntoIter = std::slice::Iter<'a, RuleEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromStr for RuleSet {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}
