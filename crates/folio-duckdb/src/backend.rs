use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use duckdb::Connection;
use tokio::sync::Mutex;
use tracing::info;

use crate::schema::init_sql;

/// Generate a cryptographically random hex string of `n` bytes (2n hex chars).
pub(crate) fn rand_hex(n: usize) -> String {
    use rand::RngCore;
    let mut buf = vec![0u8; n];
    rand::thread_rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Format a timestamp the way every query in this crate binds it: naive
/// UTC with a fixed six-digit fraction, which DuckDB casts to TIMESTAMP
/// without ambiguity.
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.naive_utc().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

/// A DuckDB backend for folio.
///
/// DuckDB is single-writer: concurrent reads are fine, but concurrent
/// writes cause contention. The connection is wrapped in `Arc<Mutex<_>>`
/// so the async runtime serialises all writes through the buffer-flush
/// task while still allowing the struct to be cheaply cloned and shared
/// across Axum handlers.
pub struct DuckDbBackend {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl DuckDbBackend {
    /// Open (or create) a DuckDB database file at `path`.
    ///
    /// Runs the schema init SQL on the connection so all tables and
    /// indexes are created if they do not already exist.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(init_sql())?;
        Self::seed_settings_sync(&conn)?;
        info!("DuckDB opened at {}", path);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an **in-memory** DuckDB database.
    ///
    /// This is both the test backend and the production fallback when no
    /// data directory is configured — data is discarded when the process
    /// exits.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(init_sql())?;
        Self::seed_settings_sync(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Seed the `settings` table with initial values if they don't already
    /// exist. Uses `INSERT OR IGNORE` so re-runs on every startup are safe.
    fn seed_settings_sync(conn: &Connection) -> Result<()> {
        let install_id = rand_hex(8);
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES ('version', ?1)",
            duckdb::params!["1"],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES ('install_id', ?1)",
            duckdb::params![install_id],
        )?;
        Ok(())
    }

    /// Read a value from the `settings` table.
    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query(duckdb::params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Write a value to the `settings` table, replacing any existing one.
    pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            duckdb::params![key, value],
        )?;
        Ok(())
    }

    /// Return the JWT signing secret, generating and persisting a fresh
    /// 32-byte random one on first use.
    ///
    /// `INSERT OR IGNORE` + read-back keeps concurrent callers agreeing on
    /// a single secret.
    pub async fn ensure_jwt_secret(&self) -> Result<String> {
        let conn = self.conn.lock().await;
        let candidate = rand_hex(32);
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES ('jwt_secret', ?1)",
            duckdb::params![candidate],
        )?;
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = 'jwt_secret'")?;
        let secret: String = stmt.query_row([], |row| row.get(0))?;
        Ok(secret)
    }

    /// Liveness probe: a trivial query against the connection.
    pub async fn ping(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT 1")?;
        let _: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(())
    }

    /// Direct connection access for integration tests.
    pub async fn conn_for_test(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
