//! Cookie stores: where records come from and where the survivors go back.
//!
//! Two adapters exist:
//! - [`NetscapeCookieFile`] - a `cookies.txt` file as written by curl, wget
//!   and browser export extensions
//! - [`ChromeCookieStore`] - the `SQLite` `Cookies` database of a Chrome profile

mod chrome;
mod error;
mod netscape;
mod record;

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;

pub use chrome::{ChromeCookieStore, default_cookie_db_candidates};
pub use error::{StoreDbErrorKind, StoreError};
pub use netscape::{NetscapeCookieFile, parse_netscape_cookies, render_netscape_cookies};
pub use record::{CookieRecord, RecordSource};

/// Which adapter backs a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    Netscape,
    Chrome,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Netscape => write!(f, "netscape"),
            Self::Chrome => write!(f, "chrome"),
        }
    }
}

/// A persisted cookie collection.
///
/// `save` receives the records to keep, each carrying the [`RecordSource`]
/// its own `load` attached, and replaces the persisted set with them.
#[async_trait]
pub trait CookieStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// File the store lives in.
    fn location(&self) -> &Path;

    /// Reads every record, in store order.
    async fn load(&self) -> Result<Vec<CookieRecord>, StoreError>;

    /// Replaces the persisted records with `retained`.
    async fn save(&self, retained: &[CookieRecord]) -> Result<(), StoreError>;
}
