//! Error types for cookie store adapters.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Classification of `SQLite` failures from the Chrome adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreDbErrorKind {
    /// The database is locked, usually because the browser is running.
    BusyOrLocked,
    /// The file is not a database or lacks the `cookies` table.
    Schema,
    /// Filesystem or transport IO failure.
    Io,
    /// Unclassified database failure.
    Other,
}

impl StoreDbErrorKind {
    #[must_use]
    pub fn from_sqlx(error: &sqlx::Error) -> Self {
        match error {
            sqlx::Error::Io(_) => Self::Io,
            sqlx::Error::ColumnNotFound(_) | sqlx::Error::ColumnDecode { .. } => Self::Schema,
            sqlx::Error::Database(database_error) => {
                classify_database_error(database_error.as_ref())
            }
            _ => Self::Other,
        }
    }
}

fn classify_database_error(
    database_error: &(dyn sqlx::error::DatabaseError + 'static),
) -> StoreDbErrorKind {
    let code = database_error.code();
    if matches!(
        code.as_deref(),
        Some("SQLITE_BUSY" | "SQLITE_LOCKED" | "5" | "6")
    ) {
        return StoreDbErrorKind::BusyOrLocked;
    }

    let message = database_error.message().to_ascii_lowercase();
    if message.contains("database is locked") || message.contains("database is busy") {
        return StoreDbErrorKind::BusyOrLocked;
    }
    if message.contains("no such table")
        || message.contains("no such column")
        || message.contains("not a database")
    {
        return StoreDbErrorKind::Schema;
    }

    StoreDbErrorKind::Other
}

impl StoreDbErrorKind {
    fn suggestion(self) -> &'static str {
        match self {
            Self::BusyOrLocked => "Quit the browser and try again",
            Self::Schema => "Check that the path points at a Chrome 'Cookies' database",
            Self::Io | Self::Other => "Check the database file and its permissions",
        }
    }
}

impl fmt::Display for StoreDbErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BusyOrLocked => "busy_or_locked",
            Self::Schema => "schema",
            Self::Io => "io",
            Self::Other => "other",
        };
        write!(f, "{label}")
    }
}

/// Errors that can occur while loading or saving a cookie store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store does not exist.
    #[error("cookie store not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Reading or writing the store file failed.
    #[error("cannot access cookie store '{}': {source}", path.display())]
    Io {
        /// Store location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The `SQLite` store rejected an operation.
    #[error("database error ({kind}) in '{}': {message}\n  Suggestion: {}", path.display(), kind.suggestion())]
    Database {
        /// Store location.
        path: PathBuf,
        /// Typed classification.
        kind: StoreDbErrorKind,
        /// Human-readable database error text.
        message: String,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn database(path: impl Into<PathBuf>, error: &sqlx::Error) -> Self {
        Self::Database {
            path: path.into(),
            kind: StoreDbErrorKind::from_sqlx(error),
            message: error.to_string(),
        }
    }

    /// True for a store that simply isn't there.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the typed database error kind, when this is a database error.
    #[must_use]
    pub fn database_kind(&self) -> Option<StoreDbErrorKind> {
        match self {
            Self::Database { kind, .. } => Some(*kind),
            Self::NotFound { .. } | Self::Io { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_message_has_suggestion() {
        let err = StoreError::Database {
            path: PathBuf::from("/tmp/Cookies"),
            kind: StoreDbErrorKind::BusyOrLocked,
            message: "database is locked".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("busy_or_locked"));
        assert!(msg.contains("/tmp/Cookies"));
        assert!(msg.contains("Quit the browser"));
        assert_eq!(err.database_kind(), Some(StoreDbErrorKind::BusyOrLocked));
    }

    #[test]
    fn test_not_found() {
        let err = StoreError::NotFound {
            path: PathBuf::from("/nope/cookies.txt"),
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("/nope/cookies.txt"));
        assert_eq!(err.database_kind(), None);
    }

    #[test]
    fn test_sqlx_io_is_classified() {
        let err = sqlx::Error::Io(std::io::Error::other("disk gone"));
        assert_eq!(StoreDbErrorKind::from_sqlx(&err), StoreDbErrorKind::Io);
        assert_eq!(
            StoreDbErrorKind::from_sqlx(&sqlx::Error::PoolTimedOut),
            StoreDbErrorKind::Other
        );
    }
}
