//! Rule lines: a disposition plus a conjunction of criteria.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use super::criterion::{Criterion, Field, Operator};
use super::error::RuleError;
use crate::store::CookieRecord;

/// What a matching rule says about a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// `+` the cookie is wanted.
    Allow,
    /// `-` the cookie is unwanted.
    Deny,
    /// `!` the cookie is kept no matter what else matches.
    Keep,
}

impl Disposition {
    /// Returns the rule-file marker character.
    #[must_use]
    pub fn marker(self) -> char {
        match self {
            Self::Allow => '+',
            Self::Deny => '-',
            Self::Keep => '!',
        }
    }

    /// Looks up a disposition by its marker character.
    #[must_use]
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            '+' => Some(Self::Allow),
            '-' => Some(Self::Deny),
            '!' => Some(Self::Keep),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Keep => "keep",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Separators tried, in order, when rendering a rule back to text.
const SEPARATOR_CANDIDATES: &[char] = &[' ', '\t', '|', ',', ';', ':', '/', '%', '&', '#'];

/// One parsed rule. A rule matches a cookie when all of its criteria do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    disposition: Disposition,
    criteria: Vec<Criterion>,
}

impl Rule {
    /// Builds a rule from already constructed criteria.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::MalformedRule` when `criteria` is empty.
    pub fn new(disposition: Disposition, criteria: Vec<Criterion>) -> Result<Self, RuleError> {
        if criteria.is_empty() {
            return Err(RuleError::no_criteria(&disposition.marker().to_string()));
        }
        Ok(Self {
            disposition,
            criteria,
        })
    }

    /// Parses one rule line.
    ///
    /// The line is trimmed first. The character after the marker is the
    /// separator for the rest of the line.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::MalformedRule` describing the first grammar
    /// violation found.
    pub fn parse(line: &str) -> Result<Self, RuleError> {
        let text = line.trim();
        let mut chars = text.chars();
        let Some(marker) = chars.next() else {
            return Err(RuleError::empty(text));
        };
        let disposition =
            Disposition::from_marker(marker).ok_or_else(|| RuleError::bad_marker(text, marker))?;

        let Some(separator) = chars.next() else {
            return Err(RuleError::no_criteria(text));
        };
        let body = chars.as_str();
        if body.is_empty() {
            return Err(RuleError::no_criteria(text));
        }

        let criteria = body
            .split(separator)
            .map(|clause| parse_clause(text, clause))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            disposition,
            criteria,
        })
    }

    #[must_use]
    pub fn disposition(&self) -> Disposition {
        self.disposition
    }

    #[must_use]
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    /// True when every criterion matches `cookie`.
    #[must_use]
    pub fn matches(&self, cookie: &CookieRecord) -> bool {
        self.criteria.iter().all(|criterion| criterion.matches(cookie))
    }

    /// Renders the rule with an explicit separator.
    ///
    /// The result only re-parses to the same rule when `separator` occurs in
    /// none of the rendered clauses; [`fmt::Display`] picks one that doesn't.
    #[must_use]
    pub fn to_line_with(&self, separator: char) -> String {
        let mut line = String::new();
        line.push(self.disposition.marker());
        for clause in self.clauses() {
            line.push(separator);
            line.push_str(&clause);
        }
        line
    }

    fn clauses(&self) -> Vec<String> {
        self.criteria.iter().map(render_clause).collect()
    }
}

/// Bare form only when it would read back as the same criterion.
fn render_clause(criterion: &Criterion) -> String {
    if criterion.is_default_form() {
        let bare = criterion.argument();
        if parse_clause(bare, bare).is_ok_and(|parsed| parsed == *criterion) {
            return bare.to_string();
        }
    }
    criterion.to_string()
}

fn choose_separator(clauses: &[String]) -> char {
    let unused = |c: &char| !clauses.iter().any(|clause| clause.contains(*c));
    SEPARATOR_CANDIDATES
        .iter()
        .copied()
        .find(unused)
        .or_else(|| ('\u{a1}'..='\u{10ffff}').find(unused))
        .unwrap_or(' ')
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Parses one clause of `text`.
fn parse_clause(text: &str, clause: &str) -> Result<Criterion, RuleError> {
    if clause.is_empty() {
        return Err(RuleError::missing_argument(text));
    }

    let key_len = clause
        .char_indices()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(clause.len(), |(index, _)| index);
    let (key, rest) = clause.split_at(key_len);

    let (negated, after_bang) = match rest.strip_prefix('!') {
        Some(after) => (true, after),
        None => (false, rest),
    };
    let mut op_chars = after_bang.chars();
    let operator = op_chars.next().and_then(Operator::from_symbol);

    let Some(operator) = operator else {
        let known_key = key.is_empty() || Field::from_key(key).is_some();
        if negated && known_key {
            return Err(RuleError::unknown_operator(text, clause));
        }
        return Ok(Criterion::domain_suffix(Field::Domain, clause));
    };

    let field = if key.is_empty() {
        Field::Domain
    } else {
        Field::from_key(key).ok_or_else(|| RuleError::unknown_field(text, key))?
    };
    let argument = op_chars.as_str();
    if operator == Operator::Exists && !argument.is_empty() {
        debug!(clause, "ignoring argument of '?' criterion");
    }

    let criterion = Criterion::new(field, operator, argument)
        .map_err(|e| RuleError::invalid_regex(text, argument, &e))?;
    Ok(if negated { criterion.negate() } else { criterion })
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses = self.clauses();
        let separator = choose_separator(&clauses);
        write!(f, "{}", self.disposition.marker())?;
        for clause in &clauses {
            write!(f, "{separator}{clause}")?;
        }
        Ok(())
    }
}

impl FromStr for Rule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn only_criterion(line: &str) -> Criterion {
        let rule = Rule::parse(line).unwrap();
        assert_eq!(rule.criteria().len(), 1, "{line}");
        rule.criteria()[0].clone()
    }

    #[test]
    fn test_markers() {
        assert_eq!(Rule::parse("+ a.com").unwrap().disposition(), Disposition::Allow);
        assert_eq!(Rule::parse("- a.com").unwrap().disposition(), Disposition::Deny);
        assert_eq!(Rule::parse("! a.com").unwrap().disposition(), Disposition::Keep);
    }

    #[test]
    fn test_bare_clause_is_domain_suffix() {
        let criterion = only_criterion("+ .banksite.com");
        assert_eq!(
            criterion,
            Criterion::domain_suffix(Field::Domain, ".banksite.com")
        );
    }

    #[test]
    fn test_keyed_clauses() {
        assert_eq!(
            only_criterion("- name~^__utm[abvz]$"),
            Criterion::regex(Field::Name, "^__utm[abvz]$").unwrap()
        );
        assert_eq!(
            only_criterion("! value=SaveMe"),
            Criterion::equals(Field::Value, "SaveMe")
        );
        assert_eq!(
            only_criterion("- httponly?"),
            Criterion::exists(Field::HttpOnly)
        );
        assert_eq!(
            only_criterion("- PATH!~^/ads"),
            Criterion::regex(Field::Path, "^/ads").unwrap().negate()
        );
    }

    #[test]
    fn test_keyless_operator_defaults_to_domain() {
        assert_eq!(
            only_criterion("- =tracker.net"),
            Criterion::equals(Field::Domain, "tracker.net")
        );
        assert_eq!(
            only_criterion("- !@.good.com"),
            Criterion::domain_suffix(Field::Domain, ".good.com").negate()
        );
    }

    #[test]
    fn test_multiple_clauses_and_custom_separator() {
        let rule = Rule::parse("+ .somehost.com domain!=foo.somehost.com").unwrap();
        assert_eq!(rule.criteria().len(), 2);
        assert!(rule.criteria()[1].is_negated());

        let rule = Rule::parse("-|path~^/a b|httponly?").unwrap();
        assert_eq!(rule.criteria().len(), 2);
        assert_eq!(rule.criteria()[0].argument(), "^/a b");
    }

    #[test]
    fn test_hash_inside_argument_is_literal() {
        let criterion = only_criterion("- value=a#b");
        assert_eq!(criterion.argument(), "a#b");
    }

    #[test]
    fn test_exists_argument_is_ignored() {
        assert_eq!(
            only_criterion("- value?whatever"),
            Criterion::exists(Field::Value)
        );
    }

    #[test]
    fn test_empty_equals_argument_is_valid() {
        assert_eq!(
            only_criterion("- value="),
            Criterion::equals(Field::Value, "")
        );
    }

    #[test]
    fn test_bad_marker_rejected() {
        let err = Rule::parse("* .example.com").unwrap_err();
        assert!(err.to_string().contains("'*' is not a rule marker"));
    }

    #[test]
    fn test_marker_without_clauses_rejected() {
        for line in ["+", "+ ", "-|"] {
            let err = Rule::parse(line).unwrap_err();
            assert!(err.to_string().contains("no criteria"), "{line}: {err}");
        }
    }

    #[test]
    fn test_negation_without_operator_rejected() {
        let err = Rule::parse("- name!:x").unwrap_err();
        assert!(err.to_string().contains("no recognized operator"), "{err}");
        assert!(Rule::parse("- !x").is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Rule::parse("- color=red").unwrap_err();
        assert!(err.to_string().contains("'color' is not a cookie field"));
    }

    #[test]
    fn test_unknown_word_without_operator_is_bare_domain() {
        assert_eq!(
            only_criterion("+ example.com"),
            Criterion::domain_suffix(Field::Domain, "example.com")
        );
    }

    #[test]
    fn test_empty_clause_rejected() {
        let err = Rule::parse("+ a.com  b.com").unwrap_err();
        assert!(err.to_string().contains("empty criterion"), "{err}");
    }

    #[test]
    fn test_invalid_regex_rejected_at_parse() {
        let err = Rule::parse("- name~(unclosed").unwrap_err();
        assert!(err.to_string().contains("invalid regular expression"));
    }

    #[test]
    fn test_new_requires_criteria() {
        assert!(Rule::new(Disposition::Allow, Vec::new()).is_err());
        assert!(
            Rule::new(Disposition::Allow, vec![Criterion::exists(Field::Name)]).is_ok()
        );
    }

    #[test]
    fn test_display_uses_bare_form() {
        let rule = Rule::parse("+ .somehost.com domain!=foo.somehost.com").unwrap();
        assert_eq!(rule.to_string(), "+ .somehost.com domain!=foo.somehost.com");
    }

    #[test]
    fn test_display_avoids_separator_inside_clauses() {
        let rule = Rule::parse("-|path~^/a b|name=x").unwrap();
        let rendered = rule.to_string();
        assert_eq!(rendered, "-\tpath~^/a b\tname=x");
        assert_eq!(Rule::parse(&rendered).unwrap(), rule);
    }

    #[test]
    fn test_display_falls_back_to_explicit_domain() {
        // A bare "name=x" would read back as a name criterion.
        let rule = Rule::new(
            Disposition::Deny,
            vec![Criterion::domain_suffix(Field::Domain, "name=x")],
        )
        .unwrap();
        assert_eq!(rule.to_string(), "- domain@name=x");
        assert_eq!(Rule::parse(&rule.to_string()).unwrap(), rule);
    }

    #[test]
    fn test_round_trip() {
        let lines = [
            "+ .banksite.com",
            "- name~^__utm[abvz]$",
            "! value=SaveMe",
            "- httponly!?",
            "+ domain@",
            "-,value=a b,path~x|y",
        ];
        for line in lines {
            let rule = Rule::parse(line).unwrap();
            let reparsed = Rule::parse(&rule.to_string()).unwrap();
            assert_eq!(reparsed, rule, "{line}");
        }
    }

    #[test]
    fn test_matches_is_conjunction() {
        let rule = Rule::parse("+ .somehost.com domain!=foo.somehost.com").unwrap();
        let at = |domain: &str| rule.matches(&CookieRecord::empty().with_domain(domain));
        assert!(at("bar.somehost.com"));
        assert!(!at("foo.somehost.com"));
        assert!(!at("other.com"));
    }
}
