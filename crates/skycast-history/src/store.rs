//! SQLite-based search history storage.
//!
//! This module provides `HistoryStore`, the single row-store behind the
//! search history read/append contract. City names are stored lowercased;
//! display casing is applied by readers.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;

/// One recorded weather search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRecord {
    pub search_id: i64,
    pub user_id: i64,
    pub city: String,
    pub searched_at: DateTime<Utc>,
}

/// SQLite-backed search history.
pub struct HistoryStore {
    conn: Mutex<Connection>,
}

impl HistoryStore {
    /// Create a new history store at the given path.
    ///
    /// Creates the database file, parent directories and schema if they
    /// don't exist.
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory history store (for testing).
    #[cfg(test)]
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> anyhow::Result<()> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS search_history (
                search_id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                city TEXT NOT NULL,
                searched_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_search_history_user_time
                ON search_history(user_id, searched_at DESC);
            "#,
        )?;
        Ok(())
    }

    /// Convert a database row to a SearchRecord.
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<SearchRecord> {
        let search_id: i64 = row.get(0)?;
        let user_id: i64 = row.get(1)?;
        let city: String = row.get(2)?;
        let searched_at_str: String = row.get(3)?;

        let searched_at = DateTime::parse_from_rfc3339(&searched_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(SearchRecord {
            search_id,
            user_id,
            city,
            searched_at,
        })
    }

    /// Append one search to a user's history.
    ///
    /// The city name is stored trimmed and lowercased so that readers see
    /// one spelling regardless of how the search was typed.
    pub fn record(&self, user_id: i64, city: &str) -> anyhow::Result<SearchRecord> {
        let city = city.trim().to_lowercase();
        let searched_at = Utc::now();

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO search_history (user_id, city, searched_at) VALUES (?1, ?2, ?3)",
            params![user_id, city, searched_at.to_rfc3339()],
        )?;
        let search_id = conn.last_insert_rowid();

        tracing::debug!("Recorded search {} for user {}", search_id, user_id);

        Ok(SearchRecord {
            search_id,
            user_id,
            city,
            searched_at,
        })
    }

    /// A user's full history, most recent first.
    pub fn list_for_user(&self, user_id: i64) -> anyhow::Result<Vec<SearchRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT search_id, user_id, city, searched_at
             FROM search_history
             WHERE user_id = ?1
             ORDER BY searched_at DESC, search_id DESC",
        )?;

        let rows = stmt.query_map(params![user_id], Self::row_to_record)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// The most recent `limit` city names searched by a user.
    ///
    /// Duplicates are returned as stored; callers wanting a deduplicated
    /// display list should fetch a wider window and collapse it themselves.
    pub fn recent(&self, user_id: i64, limit: usize) -> anyhow::Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT city
             FROM search_history
             WHERE user_id = ?1
             ORDER BY searched_at DESC, search_id DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![user_id, limit as i64], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
