//! Schema normalization: canonical headers, numeric/date cleaning
//!
//! Turns a [`RawTable`] into canonical records through a fixed sequence
//! of total cleaning steps. Coercion failures never raise: unparseable
//! dates become a missing sentinel (and the row is dropped at the end),
//! unparseable numbers coerce to 0.0. Best-effort ingestion over strict
//! validation.

use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use crate::error::Result;
use crate::models::{CanonicalRecord, TransactionType};
use crate::parse::RawTable;

/// Header synonym table, applied after trim/lowercase/strip-periods.
///
/// Lookup is exact-match only ("withdrawal amt" does not map), and the
/// table order is part of the contract. Unmapped headers pass through.
pub const HEADER_SYNONYMS: &[(&str, &str)] = &[
    ("date", "transaction_date"),
    ("txn date", "transaction_date"),
    ("value date", "value_date"),
    ("particulars", "remarks"),
    ("narrative", "remarks"),
    ("desc", "remarks"),
    ("description", "remarks"),
    ("withdrawal", "debit"),
    ("dr", "debit"),
    ("deposit", "credit"),
    ("cr", "credit"),
    ("bal", "balance"),
    ("ref", "reference_no"),
    ("chq", "cheque_no"),
];

/// Canonicalize one header cell: trim, lowercase, strip periods, then
/// map through the synonym table.
pub fn canonicalize_header(raw: &str) -> String {
    let cleaned = raw.trim().to_lowercase().replace('.', "");
    for (synonym, canonical) in HEADER_SYNONYMS {
        if cleaned == *synonym {
            return canonical.to_string();
        }
    }
    cleaned
}

/// Lenient multi-format date parser; `None` is the missing sentinel.
pub fn parse_date_lenient(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let formats = [
        "%Y-%m-%d", // 2024-04-01
        "%m/%d/%Y", // 04/01/2024
        "%d/%m/%Y", // 01/04/2024 (day-first statements)
        "%m-%d-%Y", // 04-01-2024
        "%d-%m-%Y", // 01-04-2024
        "%d/%m/%y", // 01/04/24
        "%d-%b-%Y", // 01-Apr-2024
        "%d %b %Y", // 01 Apr 2024
        "%Y/%m/%d", // 2024/04/01
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    // Datetime cells from spreadsheets carry a time component
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date())
        .ok()
}

/// Clean a numeric cell: strip thousands separators, the "$" currency
/// symbol, and the literal banking suffixes "Cr"/"Dr" (case-sensitive),
/// then parse. Anything unparseable coerces to 0.0.
pub fn clean_number(s: &str) -> f64 {
    let cleaned = s
        .replace(',', "")
        .replace('$', "")
        .replace("Cr", "")
        .replace("Dr", "");

    cleaned.trim().parse::<f64>().unwrap_or(0.0)
}

/// Normalize a raw table into canonical records.
///
/// Steps, in order:
/// 1. canonicalize headers through [`HEADER_SYNONYMS`]
/// 2. drop rows that are empty across all columns
/// 3. lenient date parse for `transaction_date`
/// 4. numeric cleaning for debit/credit/balance
/// 5. derive `net_amount` and `transaction_type` when both debit and
///    credit columns exist
/// 6. drop rows without a parseable `transaction_date`
///
/// Survivor order matches the input order.
pub fn normalize(table: &RawTable) -> Vec<CanonicalRecord> {
    let headers: Vec<String> = table
        .headers
        .iter()
        .map(|h| canonicalize_header(h))
        .collect();

    let col = |name: &str| headers.iter().position(|h| h == name);
    let date_idx = col("transaction_date");
    let remarks_idx = col("remarks");
    let debit_idx = col("debit");
    let credit_idx = col("credit");
    let balance_idx = col("balance");

    let has_debit_credit = debit_idx.is_some() && credit_idx.is_some();

    let cell = |row: &[String], idx: Option<usize>| -> String {
        idx.and_then(|i| row.get(i))
            .map(|c| c.trim().to_string())
            .unwrap_or_default()
    };

    let mut records = Vec::new();
    for row in &table.rows {
        // Step 2: purely empty rows carry no information
        if row.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        // Step 3: missing/unparseable dates fall out in the final filter
        let date = parse_date_lenient(&cell(row, date_idx));

        // Step 4
        let debit = clean_number(&cell(row, debit_idx));
        let credit = clean_number(&cell(row, credit_idx));
        let balance = clean_number(&cell(row, balance_idx));

        // Step 5: derived only when the source carried both columns
        let (net_amount, transaction_type) = if has_debit_credit {
            (
                Some(credit - debit),
                Some(TransactionType::from_amounts(debit, credit)),
            )
        } else {
            (None, None)
        };

        // Step 6: the final output filter
        let Some(transaction_date) = date else {
            continue;
        };

        records.push(CanonicalRecord {
            transaction_date,
            remarks: cell(row, remarks_idx),
            debit,
            credit,
            balance,
            net_amount,
            transaction_type,
        });
    }

    debug!(
        "Normalized {} of {} raw rows",
        records.len(),
        table.rows.len()
    );
    records
}

/// Canonical column order of the cleaned CSV artifact.
///
/// A source `amount` column is not carried: the signed amount is
/// derived as `credit - debit` at load time, never read from the
/// source.
const CLEANED_COLUMNS: &[&str] = &[
    "transaction_date",
    "remarks",
    "debit",
    "credit",
    "balance",
    "net_amount",
    "transaction_type",
];

/// Write the per-session cleaned CSV, the exchange artifact between
/// normalization and loading.
pub fn export_cleaned_csv(records: &[CanonicalRecord], path: &Path) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(CLEANED_COLUMNS)?;

    for rec in records {
        wtr.write_record(&[
            rec.transaction_date.format("%Y-%m-%d").to_string(),
            rec.remarks.clone(),
            rec.debit.to_string(),
            rec.credit.to_string(),
            rec.balance.to_string(),
            rec.net_amount.map(|a| a.to_string()).unwrap_or_default(),
            rec.transaction_type
                .map(|t| t.to_string())
                .unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read a cleaned CSV back into canonical records.
///
/// Used by the load phase; applies the same leniency as normalization
/// (numeric defaults to 0.0, undated rows dropped).
pub fn read_cleaned_csv(path: &Path) -> Result<Vec<CanonicalRecord>> {
    let file = std::fs::File::open(path)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let col = |name: &str| headers.iter().position(|h| h == name);
    let date_idx = col("transaction_date");
    let remarks_idx = col("remarks");
    let debit_idx = col("debit");
    let credit_idx = col("credit");
    let balance_idx = col("balance");

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let cell = |idx: Option<usize>| -> String {
            idx.and_then(|i| record.get(i))
                .map(|c| c.trim().to_string())
                .unwrap_or_default()
        };

        let Some(transaction_date) = parse_date_lenient(&cell(date_idx)) else {
            continue;
        };

        let debit = clean_number(&cell(debit_idx));
        let credit = clean_number(&cell(credit_idx));
        let balance = clean_number(&cell(balance_idx));

        records.push(CanonicalRecord {
            transaction_date,
            remarks: cell(remarks_idx),
            debit,
            credit,
            balance,
            net_amount: Some(credit - debit),
            transaction_type: Some(TransactionType::from_amounts(debit, credit)),
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_canonicalize_header_synonyms() {
        assert_eq!(canonicalize_header("Particulars"), "remarks");
        assert_eq!(canonicalize_header(" Withdrawal "), "debit");
        assert_eq!(canonicalize_header("DR"), "debit");
        assert_eq!(canonicalize_header("Deposit"), "credit");
        assert_eq!(canonicalize_header("Bal."), "balance");
        assert_eq!(canonicalize_header("Txn Date"), "transaction_date");
    }

    #[test]
    fn test_canonicalize_header_exact_match_only() {
        // "Withdrawal Amt." cleans to "withdrawal amt", which is not an
        // exact synonym and must pass through unchanged
        assert_eq!(canonicalize_header("Withdrawal Amt."), "withdrawal amt");
    }

    #[test]
    fn test_canonicalize_header_passthrough() {
        assert_eq!(canonicalize_header("Cheque Number"), "cheque number");
    }

    #[test]
    fn test_clean_number() {
        assert_eq!(clean_number("1,234.50"), 1234.5);
        assert_eq!(clean_number("$99"), 99.0);
        assert_eq!(clean_number("500 Cr"), 500.0);
        assert_eq!(clean_number("120.25 Dr"), 120.25);
        assert_eq!(clean_number("garbage"), 0.0);
        assert_eq!(clean_number(""), 0.0);
    }

    #[test]
    fn test_clean_number_suffix_is_case_sensitive() {
        // Only the literal "Cr"/"Dr" notation is stripped; a lowercase
        // suffix leaves the cell unparseable and it coerces to 0.0
        assert_eq!(clean_number("500 cr"), 0.0);
        assert_eq!(clean_number("500 CR"), 0.0);
    }

    #[test]
    fn test_parse_date_lenient() {
        let expected = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert_eq!(parse_date_lenient("2024-04-01"), Some(expected));
        assert_eq!(parse_date_lenient("04/01/2024"), Some(expected));
        assert_eq!(parse_date_lenient("01-Apr-2024"), Some(expected));
        assert_eq!(parse_date_lenient("not a date"), None);
        assert_eq!(parse_date_lenient(""), None);
    }

    #[test]
    fn test_normalize_basic() {
        let t = table(
            &["Date", "Particulars", "Withdrawal", "Deposit", "Bal."],
            &[
                &["01/04/2024", "UPI/1/PAY/Shop/HDFC", "500", "0", "1,200.50"],
                &["02/04/2024", "SALARY", "0", "25000", "26200.50"],
            ],
        );
        let records = normalize(&t);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].debit, 500.0);
        assert_eq!(records[0].balance, 1200.5);
        assert_eq!(records[0].net_amount, Some(-500.0));
        assert_eq!(records[0].transaction_type, Some(TransactionType::Debit));

        assert_eq!(records[1].net_amount, Some(25000.0));
        assert_eq!(records[1].transaction_type, Some(TransactionType::Credit));
    }

    #[test]
    fn test_normalize_drops_empty_and_undated_rows() {
        let t = table(
            &["Date", "Particulars", "Withdrawal", "Deposit"],
            &[
                &["", "", "", ""],
                &["opening balance", "B/F", "", ""],
                &["01/04/2024", "REAL ROW", "10", "0"],
            ],
        );
        let records = normalize(&t);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].remarks, "REAL ROW");
    }

    #[test]
    fn test_normalize_preserves_row_order() {
        let t = table(
            &["Date", "Desc", "Dr", "Cr"],
            &[
                &["03/04/2024", "third", "1", "0"],
                &["junk", "dropped", "", ""],
                &["01/04/2024", "first", "2", "0"],
            ],
        );
        let records = normalize(&t);
        assert_eq!(records.len(), 2);
        // Original order, not date order
        assert_eq!(records[0].remarks, "third");
        assert_eq!(records[1].remarks, "first");
    }

    #[test]
    fn test_normalize_without_debit_credit_pair() {
        // Only an amount-style column: no derived fields
        let t = table(
            &["Date", "Desc", "Withdrawal"],
            &[&["01/04/2024", "row", "42"]],
        );
        let records = normalize(&t);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].net_amount, None);
        assert_eq!(records[0].transaction_type, None);
    }

    #[test]
    fn test_normalize_neutral_row() {
        let t = table(
            &["Date", "Desc", "Dr", "Cr"],
            &[&["01/04/2024", "adjustment", "0", "0"]],
        );
        let records = normalize(&t);
        assert_eq!(records[0].transaction_type, Some(TransactionType::Neutral));
        assert_eq!(records[0].net_amount, Some(0.0));
    }

    #[test]
    fn test_cleaned_csv_round_trip() {
        let t = table(
            &["Date", "Particulars", "Withdrawal", "Deposit", "Bal."],
            &[
                &["01/04/2024", "UPI/1/PAY/Shop/HDFC", "500", "0", "700"],
                &["02/04/2024", "REFUND CREDIT", "0", "99.99", "799.99"],
            ],
        );
        let records = normalize(&t);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned_data.csv");
        export_cleaned_csv(&records, &path).unwrap();

        let reread = read_cleaned_csv(&path).unwrap();
        assert_eq!(reread.len(), records.len());
        for (a, b) in records.iter().zip(&reread) {
            assert_eq!(a.transaction_date, b.transaction_date);
            assert_eq!(a.remarks, b.remarks);
            assert_eq!(a.debit, b.debit);
            assert_eq!(a.credit, b.credit);
            assert_eq!(a.balance, b.balance);
            assert_eq!(a.net_amount, b.net_amount);
            assert_eq!(a.transaction_type, b.transaction_type);
        }
    }
}
