//! Session-scoped deletes and summaries

use chrono::NaiveDate;
use rusqlite::params;
use tracing::info;

use super::Database;
use crate::error::Result;
use crate::models::SessionSummary;

impl Database {
    /// Delete one session's rows; returns the number removed
    pub fn delete_session(&self, session_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM fact_transactions WHERE session_id = ?",
            params![session_id],
        )?;
        info!("Deleted {} rows for session {}", deleted, session_id);
        Ok(deleted)
    }

    /// Wipe the fact table; returns the number removed
    pub fn delete_all(&self) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM fact_transactions", [])?;
        info!("Deleted all {} fact rows", deleted);
        Ok(deleted)
    }

    /// Row count for one session
    pub fn count_session(&self, session_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM fact_transactions WHERE session_id = ?",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Per-session rollups, most recent activity first
    pub fn session_summaries(&self) -> Result<Vec<SessionSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT session_id,
                   COUNT(*) AS record_count,
                   MIN(txn_date) AS first_txn_date,
                   MAX(txn_date) AS last_txn_date
            FROM fact_transactions
            GROUP BY session_id
            ORDER BY last_txn_date DESC
            "#,
        )?;

        let parse_date = |s: Option<String>| {
            s.and_then(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").ok())
        };

        let rows = stmt.query_map([], |row| {
            let first: Option<String> = row.get(2)?;
            let last: Option<String> = row.get(3)?;
            Ok(SessionSummary {
                session_id: row.get(0)?,
                record_count: row.get(1)?,
                first_txn_date: parse_date(first),
                last_txn_date: parse_date(last),
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }
}
