//! Fact row insertion and the session loader

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::params;
use tracing::{error, info};

use super::{parse_datetime, Database};
use crate::classify::classify;
use crate::error::{Error, Result};
use crate::models::{CanonicalRecord, FactTransaction};
use crate::normalize::read_cleaned_csv;

impl Database {
    /// Load a session's cleaned CSV into the fact table.
    ///
    /// Reads the per-session exchange artifact, classifies each row,
    /// and inserts row by row inside a single transaction so a
    /// session's records are all-or-nothing: any insertion failure
    /// rolls the whole load back and surfaces as [`Error::Load`].
    ///
    /// Returns the number of rows loaded.
    pub fn load_session(&self, csv_path: &Path, session_id: &str) -> Result<usize> {
        let records = read_cleaned_csv(csv_path)?;
        self.load_records(&records, session_id)
    }

    /// Load already-normalized records under a session id.
    pub fn load_records(&self, records: &[CanonicalRecord], session_id: &str) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut loaded = 0usize;
        for rec in records {
            insert_fact(&tx, session_id, rec).map_err(|e| {
                // Full diagnostic detail for operators; the terse
                // message travels up with the error itself
                error!(
                    session_id,
                    row = loaded,
                    remarks = %rec.remarks,
                    error = %e,
                    "Session load failed, rolling back"
                );
                Error::Load(format!("row {} of session {}: {}", loaded, session_id, e))
            })?;
            loaded += 1;
        }

        tx.commit()?;
        info!("Loaded {} rows for session {}", loaded, session_id);
        Ok(loaded)
    }

    /// Fetch one session's rows, oldest transaction first
    pub fn session_transactions(&self, session_id: &str) -> Result<Vec<FactTransaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT txn_id, session_id, txn_date, transaction_ref_id, transaction_code,
                   transaction_method, transaction_category, transaction_nature,
                   counterparty_name, counterparty_bank_code,
                   debit, credit, amount, balance, remarks, created_at
            FROM fact_transactions
            WHERE session_id = ?
            ORDER BY txn_date, txn_id
            "#,
        )?;

        let rows = stmt.query_map(params![session_id], |row| {
            let date_str: String = row.get(2)?;
            let created_str: String = row.get(15)?;
            Ok(FactTransaction {
                txn_id: row.get(0)?,
                session_id: row.get(1)?,
                txn_date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                    .unwrap_or_default(),
                transaction_ref_id: row.get(3)?,
                transaction_code: row.get(4)?,
                transaction_method: row.get(5)?,
                transaction_category: row.get(6)?,
                transaction_nature: row.get(7)?,
                counterparty_name: row.get(8)?,
                counterparty_bank_code: row.get(9)?,
                debit: row.get(10)?,
                credit: row.get(11)?,
                amount: row.get(12)?,
                balance: row.get(13)?,
                remarks: row.get(14)?,
                created_at: parse_datetime(&created_str),
            })
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }
}

/// Insert one classified row; `created_at` is server-assigned.
fn insert_fact(
    conn: &rusqlite::Connection,
    session_id: &str,
    rec: &CanonicalRecord,
) -> rusqlite::Result<()> {
    let enrichment = classify(&rec.remarks, rec.debit, rec.credit);

    conn.execute(
        r#"
        INSERT INTO fact_transactions (
            session_id, txn_date, transaction_ref_id, transaction_code,
            transaction_method, transaction_category, transaction_nature,
            counterparty_name, counterparty_bank_code,
            debit, credit, amount, balance, remarks, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
        "#,
        params![
            session_id,
            rec.transaction_date.format("%Y-%m-%d").to_string(),
            enrichment.transaction_ref_id,
            enrichment.transaction_code,
            enrichment.transaction_method.as_str(),
            enrichment.transaction_category.as_str(),
            enrichment.transaction_nature.as_str(),
            enrichment.counterparty_name,
            enrichment.counterparty_bank_code,
            rec.debit,
            rec.credit,
            rec.credit - rec.debit,
            rec.balance,
            rec.remarks,
        ],
    )?;

    Ok(())
}
