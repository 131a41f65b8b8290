//! The three-tier decision: Keep beats Deny, Deny beats Allow, and nothing
//! is accepted without an Allow match.

use serde::Serialize;

use crate::rules::{Disposition, RuleEntry, RuleSet};
use crate::store::CookieRecord;

/// Outcome for one cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accept,
    Reject,
}

/// Which tier settled the verdict, with the matching rules of that tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason<'r> {
    /// Keep rules matched; accepted.
    Kept(Vec<&'r RuleEntry>),
    /// Deny rules matched and no Keep rule did; rejected.
    Denied(Vec<&'r RuleEntry>),
    /// Allow rules matched and no Keep or Deny rule did; accepted.
    Allowed(Vec<&'r RuleEntry>),
    /// Nothing matched; rejected.
    NoAllowMatch,
}

impl Reason<'_> {
    /// Short label used in reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Kept(_) => "kept",
            Self::Denied(_) => "denied",
            Self::Allowed(_) => "allowed",
            Self::NoAllowMatch => "no_allow_match",
        }
    }
}

/// A verdict with its explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision<'r> {
    pub verdict: Verdict,
    pub reason: Reason<'r>,
}

impl<'r> Decision<'r> {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.verdict == Verdict::Accept
    }

    /// The rules that settled the verdict (empty for [`Reason::NoAllowMatch`]).
    #[must_use]
    pub fn rules(&self) -> &[&'r RuleEntry] {
        match &self.reason {
            Reason::Kept(rules) | Reason::Denied(rules) | Reason::Allowed(rules) => rules,
            Reason::NoAllowMatch => &[],
        }
    }
}

enum Tier<T> {
    Kept(T),
    Denied(T),
    Allowed(T),
    NoAllowMatch,
}

impl<T> Tier<T> {
    fn verdict(&self) -> Verdict {
        match self {
            Self::Kept(_) | Self::Allowed(_) => Verdict::Accept,
            Self::Denied(_) | Self::NoAllowMatch => Verdict::Reject,
        }
    }
}

/// Asks `probe` about each disposition in precedence order, stopping at the
/// first that answers.
fn precedence<T>(mut probe: impl FnMut(Disposition) -> Option<T>) -> Tier<T> {
    if let Some(hit) = probe(Disposition::Keep) {
        return Tier::Kept(hit);
    }
    if let Some(hit) = probe(Disposition::Deny) {
        return Tier::Denied(hit);
    }
    match probe(Disposition::Allow) {
        Some(hit) => Tier::Allowed(hit),
        None => Tier::NoAllowMatch,
    }
}

/// Accepts `cookie` iff a Keep rule matches, or no Deny rule matches and an
/// Allow rule does. An empty rule set rejects everything.
#[must_use]
pub fn decide(cookie: &CookieRecord, rules: &RuleSet) -> Verdict {
    precedence(|disposition| {
        rules
            .with_disposition(disposition)
            .any(|entry| entry.rule().matches(cookie))
            .then_some(())
    })
    .verdict()
}

/// Like [`decide`], also collecting every matching rule of the deciding tier.
#[must_use]
pub fn explain<'r>(cookie: &CookieRecord, rules: &'r RuleSet) -> Decision<'r> {
    let tier = precedence(|disposition| {
        let hits: Vec<&RuleEntry> = rules
            .with_disposition(disposition)
            .filter(|entry| entry.rule().matches(cookie))
            .collect();
        (!hits.is_empty()).then_some(hits)
    });
    let verdict = tier.verdict();
    let reason = match tier {
        Tier::Kept(hits) => Reason::Kept(hits),
        Tier::Denied(hits) => Reason::Denied(hits),
        Tier::Allowed(hits) => Reason::Allowed(hits),
        Tier::NoAllowMatch => Reason::NoAllowMatch,
    };
    Decision { verdict, reason }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rules(text: &str) -> RuleSet {
        text.parse().unwrap()
    }

    fn at(domain: &str) -> CookieRecord {
        CookieRecord::empty().with_domain(domain).with_name("n")
    }

    #[test]
    fn test_empty_ruleset_rejects() {
        let empty = RuleSet::default();
        assert_eq!(decide(&at("example.com"), &empty), Verdict::Reject);
        assert_eq!(explain(&at("example.com"), &empty).reason, Reason::NoAllowMatch);
    }

    #[test]
    fn test_keep_beats_deny() {
        let set = rules("! value=SaveMe\n- .example.com");
        let cookie = at("x.example.com").with_value("SaveMe");
        assert_eq!(decide(&cookie, &set), Verdict::Accept);
        let decision = explain(&cookie, &set);
        assert_eq!(decision.reason.label(), "kept");
        assert_eq!(decision.rules()[0].line_number(), 1);
    }

    #[test]
    fn test_deny_beats_allow() {
        let set = rules("+ .example.com\n- name=n");
        assert_eq!(decide(&at("a.example.com"), &set), Verdict::Reject);
        let decision = explain(&at("a.example.com"), &set);
        assert!(matches!(decision.reason, Reason::Denied(ref hits) if hits.len() == 1));
    }

    #[test]
    fn test_allow_required() {
        let set = rules("+ .example.com");
        assert_eq!(decide(&at("a.example.com"), &set), Verdict::Accept);
        assert_eq!(decide(&at("other.org"), &set), Verdict::Reject);
        assert!(explain(&at("other.org"), &set).rules().is_empty());
    }

    #[test]
    fn test_explain_collects_all_matches_in_tier() {
        let set = rules("- .example.com\n+ .example.com\n- name~^n$");
        let decision = explain(&at("www.example.com"), &set);
        let lines: Vec<usize> = decision.rules().iter().map(|e| e.line_number()).collect();
        assert_eq!(lines, vec![1, 3]);
    }

    #[test]
    fn test_explain_agrees_with_decide() {
        let set = rules("+ .a.com\n- name=bad\n! path=/keep");
        let cookies = [
            at("x.a.com"),
            at("x.a.com").with_name("bad"),
            at("x.a.com").with_name("bad").with_path("/keep"),
            at("b.com"),
            at("b.com").with_path("/keep"),
        ];
        for cookie in &cookies {
            assert_eq!(explain(cookie, &set).verdict, decide(cookie, &set), "{cookie:?}");
        }
    }
}
