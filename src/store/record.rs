//! The cookie record seen by the rule engine.

use std::fmt;

use crate::rules::Field;

/// Where a record came from, so an adapter can write it back.
///
/// Rules never see this.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordSource {
    /// Built in memory, not tied to any store.
    #[default]
    Detached,
    /// A data line of a Netscape cookie file.
    Netscape {
        include_subdomains: bool,
        secure: bool,
        expires: u64,
    },
    /// A cookie-file line that could not be parsed; written back verbatim.
    Unparsed { line: String },
    /// A row of a Chrome `cookies` table.
    Chrome { rowid: i64 },
}

/// One stored cookie.
///
/// String fields are optional because stores may leave them out; an absent
/// field never matches `=`, `~` or `@`. `httponly` is always present.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct CookieRecord {
    pub domain: Option<String>,
    pub path: Option<String>,
    pub name: Option<String>,
    value: Option<String>,
    pub httponly: bool,
    pub source: RecordSource,
}

impl CookieRecord {
    /// A record with every string field absent.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_httponly(mut self, httponly: bool) -> Self {
        self.httponly = httponly;
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: RecordSource) -> Self {
        self.source = source;
        self
    }

    /// The cookie content. Never log this.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Field lookup used by criteria. `httponly` reads as `"true"`/`"false"`.
    #[must_use]
    pub fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::Domain => self.domain.as_deref(),
            Field::Path => self.path.as_deref(),
            Field::Name => self.name.as_deref(),
            Field::Value => self.value.as_deref(),
            Field::HttpOnly => Some(if self.httponly { "true" } else { "false" }),
        }
    }

    /// False when none of domain, path, name or value is present.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.domain.is_some() || self.path.is_some() || self.name.is_some() || self.value.is_some()
    }
}

impl fmt::Debug for CookieRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieRecord")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("name", &self.name)
            .field("value", &self.value.as_ref().map(|_| "[REDACTED]"))
            .field("httponly", &self.httponly)
            .field("source", &self.source)
            .finish()
    }
}
