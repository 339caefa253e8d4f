//! SQLite-based history of completed focus sessions.
//!
//! Provides persistent storage for:
//! - Completed focus sessions (duration and completion time)
//! - Daily and all-time statistics
//!
//! Queries run on Tokio's blocking pool so observers can await them from
//! async hooks.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::collab::History;
use crate::error::{HistoryError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_sessions: u64,
    pub total_focus_min: u64,
    pub today_sessions: u64,
    pub today_focus_min: u64,
}

/// SQLite store of completed focus sessions.
#[derive(Clone)]
pub struct SqliteHistory {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHistory {
    /// Open the history at `~/.config/chime/history.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("history.db");
        Self::open_at(&path)
    }

    /// Open (or create) the history database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| HistoryError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests and dry runs).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Record a completed session with an explicit completion time.
    pub async fn record_session(
        &self,
        duration: Duration,
        completed_at: DateTime<Utc>,
    ) -> Result<()> {
        let secs = duration.as_secs();
        let at = timestamp(completed_at);
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO sessions (duration_secs, completed_at) VALUES (?1, ?2)",
                params![secs, at],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn stats(&self) -> Result<Stats> {
        let since = timestamp(start_of_today());
        self.blocking(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT COUNT(*), COALESCE(SUM(duration_secs), 0),
                        COUNT(CASE WHEN completed_at >= ?1 THEN 1 END),
                        COALESCE(SUM(CASE WHEN completed_at >= ?1 THEN duration_secs END), 0)
                 FROM sessions",
            )?;
            let stats = stmt.query_row(params![since], |row| {
                Ok(Stats {
                    total_sessions: row.get(0)?,
                    total_focus_min: row.get::<_, u64>(1)? / 60,
                    today_sessions: row.get(2)?,
                    today_focus_min: row.get::<_, u64>(3)? / 60,
                })
            })?;
            Ok(stats)
        })
        .await
    }

    async fn blocking<T, F>(&self, query: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> std::result::Result<T, rusqlite::Error> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let outcome = tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            query(&conn)
        })
        .await
        .map_err(|e| HistoryError::WorkerFailed(e.to_string()))?;
        Ok(outcome.map_err(HistoryError::from)?)
    }
}

#[async_trait]
impl History for SqliteHistory {
    async fn count_completed_today(&self) -> Result<u64> {
        let since = timestamp(start_of_today());
        self.blocking(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM sessions WHERE completed_at >= ?1",
                params![since],
                |row| row.get(0),
            )
        })
        .await
    }

    async fn add_completed_session(&self, duration: Duration) -> Result<()> {
        self.record_session(duration, Utc::now()).await
    }
}

fn migrate(conn: &Connection) -> std::result::Result<(), HistoryError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS sessions (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            duration_secs INTEGER NOT NULL,
            completed_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at);",
    )?;
    Ok(())
}

/// Fixed-width UTC timestamps so text comparison orders chronologically.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Local midnight, as UTC.
fn start_of_today() -> DateTime<Utc> {
    let now = Local::now();
    now.date_naive()
        .and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest()
        .map(|midnight| midnight.with_timezone(&Utc))
        // Midnight skipped by a DST change: fall back to a rolling day.
        .unwrap_or_else(|| now.with_timezone(&Utc) - chrono::Duration::hours(24))
}
