//! SQLite-backed document store.

use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{Connection, params};
use sessionbar_aggregate::Bar;
use sessionbar_types::SeriesKey;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::{BarSink, Result, SinkError};

/// Timestamp layout of the `open_time` column.
const OPEN_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Append-only bar store.
///
/// Every bar becomes one row of the `bars` table, tagged with its collection
/// name (`{symbol}_{interval}`) and carrying both typed columns and the bar's
/// JSON document. Rows are never updated or deduplicated.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens (or creates) a store at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SinkError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        debug!(path = %path.display(), "opened bar store");

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens a private in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Returns the default store location under the platform data directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "sessionbar")
            .map_or_else(dirs_fallback, |proj_dirs| proj_dirs.data_dir().to_path_buf())
            .join("bars.db")
    }

    /// Returns the database file path, if the store is file-backed.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS bars (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                open_time TEXT NOT NULL,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                document TEXT NOT NULL,
                inserted_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_bars_collection
                ON bars(collection, open_time);
            ",
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SinkError::Poisoned)
    }

    /// Counts the rows stored under `collection`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self, collection: &str) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM bars WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Loads the bars of `collection` in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a document cannot be decoded.
    pub fn load(&self, collection: &str) -> Result<Vec<Bar>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT document FROM bars WHERE collection = ?1 ORDER BY id")?;
        let documents = stmt
            .query_map(params![collection], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        documents
            .iter()
            .map(|doc| {
                serde_json::from_str(doc).map_err(|source| SinkError::Document {
                    collection: collection.to_string(),
                    source,
                })
            })
            .collect()
    }

    /// Lists every collection name present in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn collections(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT DISTINCT collection FROM bars ORDER BY collection")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

impl BarSink for SqliteStore {
    fn write_series(&self, key: &SeriesKey, bars: &[Bar]) -> Result<usize> {
        let collection = key.to_string();
        let inserted_at = Utc::now().to_rfc3339();

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO bars
                    (collection, open_time, open, high, low, close, document, inserted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for bar in bars {
                let document = serde_json::to_string(bar)?;
                stmt.execute(params![
                    collection,
                    bar.open_time.format(OPEN_TIME_FORMAT).to_string(),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    document,
                    inserted_at,
                ])?;
            }
        }
        tx.commit()?;

        debug!(collection = %collection, bars = bars.len(), "stored series");
        Ok(bars.len())
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}

fn dirs_fallback() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".sessionbar")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sessionbar_types::Interval;
    use tempfile::tempdir;

    fn bar(hour: u32, minute: u32, close: f64) -> Bar {
        let ts = NaiveDate::from_ymd_opt(2016, 10, 10)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap();
        Bar::new(ts, 100.0, 105.0, 99.0, close)
    }

    #[test]
    fn test_write_and_load() {
        let store = SqliteStore::open_in_memory().unwrap();
        let key = SeriesKey::new("FG705", Interval::MINUTE15);
        let bars = vec![bar(9, 0, 101.0), bar(9, 15, 102.0)];

        assert_eq!(store.write_series(&key, &bars).unwrap(), 2);
        assert_eq!(store.count("FG705_15m").unwrap(), 2);
        assert_eq!(store.load("FG705_15m").unwrap(), bars);
    }

    #[test]
    fn test_append_only() {
        let store = SqliteStore::open_in_memory().unwrap();
        let key = SeriesKey::new("FG705", Interval::MINUTE15);
        let bars = vec![bar(9, 0, 101.0)];

        store.write_series(&key, &bars).unwrap();
        store.write_series(&key, &bars).unwrap();

        // Re-running the same input duplicates rows.
        assert_eq!(store.count("FG705_15m").unwrap(), 2);
    }

    #[test]
    fn test_collections() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .write_series(&SeriesKey::new("RU1701", Interval::MINUTE15), &[bar(21, 0, 1.0)])
            .unwrap();
        store
            .write_series(&SeriesKey::new("FG705", Interval::MINUTE15), &[bar(9, 0, 1.0)])
            .unwrap();

        assert_eq!(store.collections().unwrap(), vec!["FG705_15m", "RU1701_15m"]);
        assert_eq!(store.count("missing").unwrap(), 0);
    }

    #[test]
    fn test_empty_series() {
        let store = SqliteStore::open_in_memory().unwrap();
        let key = SeriesKey::new("FG705", Interval::MINUTE15);
        assert_eq!(store.write_series(&key, &[]).unwrap(), 0);
        assert!(store.collections().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("bars.db");
        let key = SeriesKey::new("FG705", Interval::MINUTE15);

        {
            let store = SqliteStore::open(&path).unwrap();
            store.write_series(&key, &[bar(9, 0, 101.0)]).unwrap();
            assert_eq!(store.path(), Some(path.as_path()));
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.count("FG705_15m").unwrap(), 1);
    }

    #[test]
    fn test_default_path() {
        assert!(SqliteStore::default_path().ends_with("bars.db"));
    }
}
