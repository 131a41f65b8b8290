//! Chrome `SQLite` cookie database.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, instrument};

use super::{CookieRecord, CookieStore, RecordSource, StoreError, StoreKind};

/// How long to wait on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_COOKIES: &str = "SELECT rowid AS cookie_rowid, host_key, path, name, value, \
     length(encrypted_value) AS encrypted_len, is_httponly FROM cookies";

/// The `Cookies` database of one Chrome profile.
///
/// Rows are identified by `rowid`. `save` deletes the rows seen by the last
/// `load` that are not among the retained records; rows added by the browser
/// in between are left alone.
#[derive(Debug)]
pub struct ChromeCookieStore {
    path: PathBuf,
    loaded: Mutex<HashSet<i64>>,
}

impl ChromeCookieStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: Mutex::new(HashSet::new()),
        }
    }

    async fn connect(&self) -> Result<SqlitePool, StoreError> {
        if !matches!(tokio::fs::try_exists(&self.path).await, Ok(true)) {
            return Err(StoreError::NotFound {
                path: self.path.clone(),
            });
        }
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(false)
            .busy_timeout(BUSY_TIMEOUT);
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::database(&self.path, &e))
    }
}

#[async_trait]
impl CookieStore for ChromeCookieStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Chrome
    }

    fn location(&self) -> &Path {
        &self.path
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<CookieRecord>, StoreError> {
        let pool = self.connect().await?;
        let rows = sqlx::query(SELECT_COOKIES).fetch_all(&pool).await;
        pool.close().await;
        let rows = rows.map_err(|e| StoreError::database(&self.path, &e))?;

        let mut records = Vec::with_capacity(rows.len());
        let mut rowids = HashSet::with_capacity(rows.len());
        for row in rows {
            let record = record_from_row(&row).map_err(|e| StoreError::database(&self.path, &e))?;
            if let RecordSource::Chrome { rowid } = record.source {
                rowids.insert(rowid);
            }
            records.push(record);
        }
        debug!(count = records.len(), "cookie database loaded");

        *self.loaded.lock().unwrap_or_else(PoisonError::into_inner) = rowids;
        Ok(records)
    }

    #[instrument(skip(self, retained), fields(path = %self.path.display(), count = retained.len()))]
    async fn save(&self, retained: &[CookieRecord]) -> Result<(), StoreError> {
        let keep: HashSet<i64> = retained
            .iter()
            .filter_map(|record| match record.source {
                RecordSource::Chrome { rowid } => Some(rowid),
                _ => None,
            })
            .collect();
        let mut doomed: Vec<i64> = self
            .loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .difference(&keep)
            .copied()
            .collect();
        if doomed.is_empty() {
            return Ok(());
        }
        doomed.sort_unstable();

        let pool = self.connect().await?;
        let result = delete_rows(&pool, &doomed).await;
        pool.close().await;
        result.map_err(|e| StoreError::database(&self.path, &e))?;

        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        for rowid in &doomed {
            loaded.remove(rowid);
        }
        debug!(deleted = doomed.len(), "cookie rows deleted");
        Ok(())
    }
}

async fn delete_rows(pool: &SqlitePool, rowids: &[i64]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for rowid in rowids {
        sqlx::query("DELETE FROM cookies WHERE rowid = ?")
            .bind(rowid)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await
}

/// An empty plaintext value next to an encrypted one loads as absent.
fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<CookieRecord, sqlx::Error> {
    let rowid: i64 = row.try_get("cookie_rowid")?;
    let value: Option<String> = row.try_get("value")?;
    let encrypted_len: Option<i64> = row.try_get("encrypted_len")?;
    let httponly: Option<i64> = row.try_get("is_httponly")?;

    let mut record = CookieRecord::empty()
        .with_httponly(httponly.unwrap_or(0) != 0)
        .with_source(RecordSource::Chrome { rowid });
    record.domain = row.try_get("host_key")?;
    record.path = row.try_get("path")?;
    record.name = row.try_get("name")?;

    let encrypted = encrypted_len.unwrap_or(0) > 0;
    match value {
        Some(value) if value.is_empty() && encrypted => {}
        Some(value) => record = record.with_value(value),
        None => {}
    }
    Ok(record)
}

/// Where Chrome keeps the default profile's cookie database, newest layout first.
#[must_use]
pub fn default_cookie_db_candidates(home: &Path) -> Vec<PathBuf> {
    let roots = if cfg!(target_os = "macos") {
        vec![home.join("Library/Application Support/Google/Chrome")]
    } else if cfg!(windows) {
        vec![home.join("AppData/Local/Google/Chrome/User Data")]
    } else {
        vec![
            home.join(".config/google-chrome"),
            home.join(".config/chromium"),
        ]
    };
    roots
        .into_iter()
        .flat_map(|root| {
            [
                root.join("Default").join("Network").join("Cookies"),
                root.join("Default").join("Cookies"),
            ]
        })
        .collect()
}
