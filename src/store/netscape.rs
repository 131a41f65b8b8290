//! Netscape `cookies.txt` store.
//!
//! Each data line holds 7 TAB-separated fields: `domain`,
//! `include_subdomains`, `path`, `secure`, `expires`, `name`, `value`.
//! A `#HttpOnly_` prefix on the domain marks an `HttpOnly` cookie; any other
//! line starting with `#` is a comment.
//!
//! Comments and blank lines are not kept. A rewrite starts from a fresh
//! header followed by the retained cookie lines.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::{CookieRecord, CookieStore, RecordSource, StoreError, StoreKind};

const HTTPONLY_PREFIX: &str = "#HttpOnly_";

const HEADER: &str = "# Netscape HTTP Cookie File\n\
# This file was rewritten by washcookies. Edit at your own risk.\n\n";

/// A cookie file on disk.
#[derive(Debug, Clone)]
pub struct NetscapeCookieFile {
    path: PathBuf,
}

impl NetscapeCookieFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CookieStore for NetscapeCookieFile {
    fn kind(&self) -> StoreKind {
        StoreKind::Netscape
    }

    fn location(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<CookieRecord>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        let records = parse_netscape_cookies(bytes.as_slice())
            .map_err(|e| StoreError::io(&self.path, e))?;
        debug!(count = records.len(), "cookie file loaded");
        Ok(records)
    }

    #[instrument(skip(self, retained), fields(path = %self.path.display(), count = retained.len()))]
    async fn save(&self, retained: &[CookieRecord]) -> Result<(), StoreError> {
        let contents = render_netscape_cookies(retained);
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, contents.as_bytes()))
            .await
            .map_err(|e| StoreError::io(&self.path, std::io::Error::other(e)))?
            .map_err(|e| StoreError::io(&self.path, e))?;
        debug!("cookie file rewritten");
        Ok(())
    }
}

/// Replaces `path` through a sibling temp file, which tempfile creates 0600.
fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(parent)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Parses a Netscape-format cookie file.
///
/// Blank and comment lines are dropped. A data line that does not parse is
/// returned as an unusable record carrying the raw line, so it survives a
/// rewrite untouched.
///
/// # Errors
///
/// Returns the read error, including invalid UTF-8.
#[instrument(level = "debug", skip(reader))]
pub fn parse_netscape_cookies(reader: impl BufRead) -> std::io::Result<Vec<CookieRecord>> {
    let mut records = Vec::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let raw = line_result?;
        let line = raw.trim_end_matches(['\r', '\n']);

        if line.trim().is_empty() {
            continue;
        }
        let (line_body, httponly) = match line.strip_prefix(HTTPONLY_PREFIX) {
            Some(rest) => (rest, true),
            None if line.starts_with('#') => continue,
            None => (line, false),
        };

        match parse_cookie_line(line_body) {
            Ok(record) => records.push(record.with_httponly(httponly)),
            Err(reason) => {
                warn!(line = line_number, %reason, "keeping unparseable cookie line as-is");
                records.push(CookieRecord::empty().with_source(RecordSource::Unparsed {
                    line: line.to_string(),
                }));
            }
        }
    }

    Ok(records)
}

/// Parses the fields of one data line (without any `#HttpOnly_` prefix).
fn parse_cookie_line(line: &str) -> Result<CookieRecord, String> {
    let fields: Vec<&str> = line.split('\t').collect();

    // Some exporters drop the trailing TAB of an empty value.
    let value = match fields.len() {
        7 => fields[6],
        6 => "",
        n => return Err(format!("expected 7 TAB-separated fields, found {n}")),
    };

    let domain = fields[0];
    if domain.is_empty() {
        return Err("domain field is empty".to_string());
    }
    let include_subdomains = parse_bool_field(fields[1], "include_subdomains")?;
    let secure = parse_bool_field(fields[3], "secure")?;
    let expires = fields[4].parse::<u64>().map_err(|_| {
        format!(
            "expires field must be a non-negative integer, got '{}'",
            fields[4]
        )
    })?;

    Ok(CookieRecord::empty()
        .with_domain(domain)
        .with_path(fields[2])
        .with_name(fields[5])
        .with_value(value)
        .with_source(RecordSource::Netscape {
            include_subdomains,
            secure,
            expires,
        }))
}

fn parse_bool_field(value: &str, field_name: &str) -> Result<bool, String> {
    if value.eq_ignore_ascii_case("TRUE") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("FALSE") {
        Ok(false)
    } else {
        Err(format!("{field_name} field must be TRUE or FALSE, got '{value}'"))
    }
}

fn flag(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

/// Renders records as a complete cookie file, header included.
#[must_use]
pub fn render_netscape_cookies(records: &[CookieRecord]) -> String {
    let mut out = String::from(HEADER);
    for record in records {
        if let RecordSource::Unparsed { line } = &record.source {
            out.push_str(line);
            out.push('\n');
            continue;
        }
        let domain = record.domain.as_deref().unwrap_or_default();
        let (include_subdomains, secure, expires) = match record.source {
            RecordSource::Netscape {
                include_subdomains,
                secure,
                expires,
            } => (include_subdomains, secure, expires),
            _ => (domain.starts_with('.'), false, 0),
        };
        if record.httponly {
            out.push_str(HTTPONLY_PREFIX);
        }
        out.push_str(&format!(
            "{domain}\t{}\t{}\t{}\t{expires}\t{}\t{}\n",
            flag(include_subdomains),
            record.path.as_deref().unwrap_or("/"),
            flag(secure),
            record.name.as_deref().unwrap_or_default(),
            record.value().unwrap_or_default(),
        ));
    }
    out
}
