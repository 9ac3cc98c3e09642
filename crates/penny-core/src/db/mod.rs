//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `clients` - Client CRUD, including cascading delete
//! - `transactions` - Transaction CRUD and the lookback query used for summaries

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::debug;

use crate::error::Result;

mod clients;
mod transactions;


pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Date format used for every DATE column
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a stored DATE column, surfacing malformed values as conversion errors
pub(crate) fn parse_date(idx: usize, s: &str) -> rusqlite::Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) a database file and run migrations
    pub fn new(path: &str) -> Result<Self> {
        // Foreign keys are a per-connection setting in SQLite
        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "penny_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().into_owned();

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the seeder's writes
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Clients (people whose spending is tracked)
            CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT,
                joined_date DATE NOT NULL
            );

            -- Transactions
            -- amount is stored as decimal TEXT so values round-trip exactly
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                client_id INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
                category TEXT NOT NULL,
                description TEXT,
                amount TEXT NOT NULL,
                date DATE NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_client_date ON transactions(client_id, date);
            "#,
        )?;

        debug!(path = %self.db_path, "Database migrations complete");
        Ok(())
    }
}
