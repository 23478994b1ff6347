//! Database access layer with connection pooling
//!
//! Organized by domain:
//! - `transactions` - fact row insertion and the session loader
//! - `sessions` - session-scoped deletes and summaries

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod sessions;
mod transactions;


pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores CURRENT_TIMESTAMP as "YYYY-MM-DD HH:MM:SS"
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (or create) the database at `path` and run migrations.
    ///
    /// A failure here is fatal to startup: the system must not accept
    /// requests without a working store.
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
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
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!(
            "{}/ledgerlift_test_{}_{}.db",
            std::env::temp_dir().display(),
            std::process::id(),
            id
        );

        // Remove any stale file from a previous run
        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Create the fact table if it does not exist
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the per-session write transaction
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- One row per classified statement transaction
            CREATE TABLE IF NOT EXISTS fact_transactions (
                txn_id INTEGER PRIMARY KEY,
                session_id TEXT NOT NULL,
                txn_date DATE NOT NULL,
                transaction_ref_id TEXT,
                transaction_code TEXT,
                transaction_method TEXT,
                transaction_category TEXT,
                transaction_nature TEXT,
                counterparty_name TEXT,
                counterparty_bank_code TEXT,
                debit REAL,
                credit REAL,
                amount REAL,
                balance REAL,
                remarks TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_fact_transactions_session
                ON fact_transactions(session_id);
            CREATE INDEX IF NOT EXISTS idx_fact_transactions_date
                ON fact_transactions(txn_date);
            "#,
        )?;

        info!("Database ready at {}", self.db_path);
        Ok(())
    }
}
