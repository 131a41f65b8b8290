//! Single field tests that make up a rule.

use std::fmt;

use regex::Regex;

use crate::store::CookieRecord;

/// The cookie fields a criterion can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Host or domain the cookie is delivered to.
    Domain,
    /// Path scope of the cookie.
    Path,
    /// Cookie name.
    Name,
    /// Cookie content.
    Value,
    /// The `HttpOnly` flag, seen by rules as the text `true` or `false`.
    HttpOnly,
}

impl Field {
    /// All fields, in rule-file documentation order.
    pub const ALL: [Field; 5] = [
        Field::Domain,
        Field::Path,
        Field::Name,
        Field::Value,
        Field::HttpOnly,
    ];

    /// Returns the rule-file key for this field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Path => "path",
            Self::Name => "name",
            Self::Value => "value",
            Self::HttpOnly => "httponly",
        }
    }

    /// Looks up a field by rule-file key, ignoring ASCII case.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operators of the rule language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=` case-insensitive equality.
    Equals,
    /// `?` the field is present.
    Exists,
    /// `~` regular-expression search.
    Regex,
    /// `@` domain matching; a leading `.` also matches subdomains.
    DomainSuffix,
}

impl Operator {
    /// Returns the rule-file symbol for this operator.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::Equals => '=',
            Self::Exists => '?',
            Self::Regex => '~',
            Self::DomainSuffix => '@',
        }
    }

    /// Looks up an operator by its rule-file symbol.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '=' => Some(Self::Equals),
            '?' => Some(Self::Exists),
            '~' => Some(Self::Regex),
            '@' => Some(Self::DomainSuffix),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Operator plus its prepared argument.
#[derive(Debug, Clone)]
enum Test {
    Equals { folded: String },
    Exists,
    Regex(Regex),
    DomainSuffix { folded: String },
}

/// One field/operator/argument test against a cookie, possibly negated.
///
/// Criteria are immutable; [`Criterion::negate`] returns a new value.
/// A field missing from the cookie never satisfies `=`, `~` or `@`, and
/// fails `?`; negation is applied afterwards.
#[derive(Debug, Clone)]
pub struct Criterion {
    field: Field,
    negated: bool,
    argument: String,
    test: Test,
}

impl Criterion {
    /// Builds a criterion from its parts.
    ///
    /// The argument of [`Operator::Exists`] is ignored.
    ///
    /// # Errors
    ///
    /// Returns the compile error when `operator` is [`Operator::Regex`] and
    /// `argument` is not a valid pattern.
    pub fn new(
        field: Field,
        operator: Operator,
        argument: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        let argument = argument.into();
        let test = match operator {
            Operator::Equals => Test::Equals {
                folded: argument.to_lowercase(),
            },
            Operator::Exists => {
                return Ok(Self::exists(field));
            }
            Operator::Regex => Test::Regex(Regex::new(&argument)?),
            Operator::DomainSuffix => Test::DomainSuffix {
                folded: argument.to_lowercase(),
            },
        };
        Ok(Self {
            field,
            negated: false,
            argument,
            test,
        })
    }

    /// `field=argument`
    #[must_use]
    pub fn equals(field: Field, argument: impl Into<String>) -> Self {
        let argument = argument.into();
        Self {
            field,
            negated: false,
            test: Test::Equals {
                folded: argument.to_lowercase(),
            },
            argument,
        }
    }

    /// `field?`
    #[must_use]
    pub fn exists(field: Field) -> Self {
        Self {
            field,
            negated: false,
            argument: String::new(),
            test: Test::Exists,
        }
    }

    /// `field@argument`
    #[must_use]
    pub fn domain_suffix(field: Field, argument: impl Into<String>) -> Self {
        let argument = argument.into();
        Self {
            field,
            negated: false,
            test: Test::DomainSuffix {
                folded: argument.to_lowercase(),
            },
            argument,
        }
    }

    /// `field~pattern`
    ///
    /// # Errors
    ///
    /// Returns the compile error for an invalid pattern.
    pub fn regex(field: Field, pattern: impl Into<String>) -> Result<Self, regex::Error> {
        Self::new(field, Operator::Regex, pattern)
    }

    /// Returns this criterion with its sense flipped.
    #[must_use]
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    #[must_use]
    pub fn field(&self) -> Field {
        self.field
    }

    #[must_use]
    pub fn operator(&self) -> Operator {
        match self.test {
            Test::Equals { .. } => Operator::Equals,
            Test::Exists => Operator::Exists,
            Test::Regex(_) => Operator::Regex,
            Test::DomainSuffix { .. } => Operator::DomainSuffix,
        }
    }

    #[must_use]
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Returns the argument as written in the rule (empty for `?`).
    #[must_use]
    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// True when this is what a bare rule-file argument means: `domain@arg`.
    #[must_use]
    pub fn is_default_form(&self) -> bool {
        self.field == Field::Domain
            && !self.negated
            && matches!(self.test, Test::DomainSuffix { .. })
    }

    /// Evaluates this criterion against one cookie.
    #[must_use]
    pub fn matches(&self, cookie: &CookieRecord) -> bool {
        let value = cookie.field(self.field);
        let hit = match (&self.test, value) {
            (Test::Exists, value) => value.is_some(),
            (_, None) => false,
            (Test::Equals { folded }, Some(value)) => value.to_lowercase() == *folded,
            (Test::Regex(regex), Some(value)) => regex.is_match(value),
            (Test::DomainSuffix { folded }, Some(value)) => {
                domain_matches(&value.to_lowercase(), folded)
            }
        };
        hit != self.negated
    }
}

/// `pattern` and `value` are both lowercased.
fn domain_matches(value: &str, pattern: &str) -> bool {
    match pattern.strip_prefix('.') {
        Some(apex) => value == apex || value.ends_with(pattern),
        None => value == pattern,
    }
}

impl PartialEq for Criterion {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field
            && self.negated == other.negated
            && self.operator() == other.operator()
            && self.argument == other.argument
    }
}

impl Eq for Criterion {}

/// Renders the explicit `key[!]op[arg]` form.
impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field.as_str())?;
        if self.negated {
            f.write_str("!")?;
        }
        write!(f, "{}{}", self.operator(), self.argument)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cookie() -> CookieRecord {
        CookieRecord::empty()
            .with_domain("www.Example.com")
            .with_path("/account")
            .with_name("__utma")
            .with_value("SaveMe")
            .with_httponly(true)
    }

    #[test]
    fn test_field_from_key_is_case_insensitive() {
        assert_eq!(Field::from_key("Domain"), Some(Field::Domain));
        assert_eq!(Field::from_key("HTTPONLY"), Some(Field::HttpOnly));
        assert_eq!(Field::from_key("expires"), None);
    }

    #[test]
    fn test_operator_symbols() {
        for op in [
            Operator::Equals,
            Operator::Exists,
            Operator::Regex,
            Operator::DomainSuffix,
        ] {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(Operator::from_symbol(':'), None);
    }

    #[test]
    fn test_equals_is_case_insensitive() {
        assert!(Criterion::equals(Field::Value, "saveme").matches(&cookie()));
        assert!(Criterion::equals(Field::Domain, "WWW.EXAMPLE.COM").matches(&cookie()));
        assert!(!Criterion::equals(Field::Value, "save").matches(&cookie()));
    }

    #[test]
    fn test_equals_fails_on_absent_field() {
        let bare = CookieRecord::empty().with_domain("example.com");
        assert!(!Criterion::equals(Field::Value, "").matches(&bare));
        assert!(Criterion::equals(Field::Value, "").negate().matches(&bare));
    }

    #[test]
    fn test_exists() {
        let bare = CookieRecord::empty().with_domain("example.com");
        assert!(Criterion::exists(Field::Domain).matches(&bare));
        assert!(!Criterion::exists(Field::Value).matches(&bare));
        assert!(Criterion::exists(Field::Value).negate().matches(&bare));
    }

    #[test]
    fn test_httponly_always_exists() {
        let off = CookieRecord::empty().with_domain("a.com");
        assert!(Criterion::exists(Field::HttpOnly).matches(&off));
        assert!(!Criterion::exists(Field::HttpOnly).negate().matches(&off));
        assert!(!Criterion::exists(Field::HttpOnly).negate().matches(&cookie()));
    }

    #[test]
    fn test_httponly_compares_as_text() {
        assert!(Criterion::equals(Field::HttpOnly, "TRUE").matches(&cookie()));
        let off = CookieRecord::empty().with_domain("a.com");
        assert!(Criterion::equals(Field::HttpOnly, "false").matches(&off));
    }

    #[test]
    fn test_regex_is_unanchored_search() {
        assert!(Criterion::regex(Field::Path, "count").unwrap().matches(&cookie()));
        assert!(Criterion::regex(Field::Name, "^__utm[abvz]$").unwrap().matches(&cookie()));
        assert!(!Criterion::regex(Field::Name, "^utm").unwrap().matches(&cookie()));
    }

    #[test]
    fn test_regex_is_case_sensitive() {
        assert!(!Criterion::regex(Field::Value, "saveme").unwrap().matches(&cookie()));
        assert!(Criterion::regex(Field::Value, "(?i)saveme").unwrap().matches(&cookie()));
    }

    #[test]
    fn test_regex_never_matches_absent_field() {
        let bare = CookieRecord::empty().with_domain("a.com");
        assert!(!Criterion::regex(Field::Value, "^$").unwrap().matches(&bare));
    }

    #[test]
    fn test_invalid_regex_is_construction_error() {
        assert!(Criterion::regex(Field::Name, "(unclosed").is_err());
        assert!(Criterion::new(Field::Name, Operator::Regex, "[").is_err());
    }

    #[test]
    fn test_domain_suffix_with_leading_dot() {
        let rule = Criterion::domain_suffix(Field::Domain, ".example.com");
        let at = |domain: &str| rule.matches(&CookieRecord::empty().with_domain(domain));
        assert!(at("a.example.com"));
        assert!(at("www.EXAMPLE.com"));
        assert!(at("example.com"));
        assert!(at(".example.com"));
        assert!(!at("notexample.com"));
        assert!(!at("example.com.evil.org"));
    }

    #[test]
    fn test_domain_suffix_without_dot_is_exact() {
        let rule = Criterion::domain_suffix(Field::Domain, "example.com");
        let at = |domain: &str| rule.matches(&CookieRecord::empty().with_domain(domain));
        assert!(at("Example.COM"));
        assert!(!at("www.example.com"));
        assert!(!at("notexample.com"));
    }

    #[test]
    fn test_domain_suffix_applies_to_other_fields() {
        let rule = Criterion::domain_suffix(Field::Name, ".tracker");
        assert!(rule.matches(&CookieRecord::empty().with_name("ad.tracker")));
        assert!(!rule.matches(&CookieRecord::empty().with_name("adtracker")));
    }

    #[test]
    fn test_negate_is_involutive() {
        let samples = [
            Criterion::equals(Field::Value, "SaveMe"),
            Criterion::exists(Field::Path),
            Criterion::regex(Field::Name, "utm").unwrap(),
            Criterion::domain_suffix(Field::Domain, ".other.com"),
        ];
        for criterion in samples {
            let twice = criterion.clone().negate().negate();
            assert_eq!(twice, criterion);
            assert_eq!(twice.matches(&cookie()), criterion.matches(&cookie()));
            assert_ne!(
                criterion.clone().negate().matches(&cookie()),
                criterion.matches(&cookie())
            );
        }
    }

    #[test]
    fn test_exists_ignores_argument() {
        let criterion = Criterion::new(Field::Value, Operator::Exists, "ignored").unwrap();
        assert_eq!(criterion.argument(), "");
        assert_eq!(criterion, Criterion::exists(Field::Value));
    }

    #[test]
    fn test_display_explicit_form() {
        let criterion = Criterion::equals(Field::Domain, "foo.somehost.com").negate();
        assert_eq!(criterion.to_string(), "domain!=foo.somehost.com");
        assert_eq!(Criterion::exists(Field::HttpOnly).to_string(), "httponly?");
    }

    #[test]
    fn test_default_form_detection() {
        assert!(Criterion::domain_suffix(Field::Domain, ".a.com").is_default_form());
        assert!(!Criterion::domain_suffix(Field::Domain, ".a.com").negate().is_default_form());
        assert!(!Criterion::domain_suffix(Field::Name, "x").is_default_form());
        assert!(!Criterion::equals(Field::Domain, "a.com").is_default_form());
    }
}
