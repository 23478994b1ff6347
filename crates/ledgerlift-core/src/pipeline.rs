//! Upload pipeline and session-folder bookkeeping
//!
//! One uploaded file becomes one session: the raw file is parked under
//! `<data_dir>/<session_id>/raw.<ext>`, parsed and normalized, and the
//! cleaned CSV is written next to it as the exchange artifact for the
//! load phase.

use std::path::{Path, PathBuf};

use tracing::info;
use uuid::Uuid;

use crate::db::Database;
use crate::error::Result;
use crate::models::SourceFormat;
use crate::normalize::{export_cleaned_csv, normalize};
use crate::parse::parse_file;

/// Name of the cleaned CSV inside a session directory
pub const CLEANED_CSV_NAME: &str = "cleaned_data.csv";

/// Result of processing one uploaded statement
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub session_id: String,
    pub csv_path: PathBuf,
    pub rows: usize,
}

/// Directory holding one session's files
pub fn session_dir(data_dir: &Path, session_id: &str) -> PathBuf {
    data_dir.join(session_id)
}

/// Parse, normalize, and stage one statement file.
///
/// Generates a fresh session id, copies the raw file into the session
/// directory, and writes the cleaned CSV. Loading into the store is a
/// separate step ([`Database::load_session`]).
pub fn process_file(
    src: &Path,
    format: SourceFormat,
    data_dir: &Path,
) -> Result<ProcessOutcome> {
    let session_id = Uuid::new_v4().to_string();
    let dir = session_dir(data_dir, &session_id);
    std::fs::create_dir_all(&dir)?;

    let raw_path = dir.join(format!("raw.{}", format.as_str()));
    std::fs::copy(src, &raw_path)?;

    let table = parse_file(&raw_path, format)?;
    let records = normalize(&table);

    let csv_path = dir.join(CLEANED_CSV_NAME);
    export_cleaned_csv(&records, &csv_path)?;

    info!(
        "Processed {} ({} format): session {}, {} rows",
        src.display(),
        format,
        session_id,
        records.len()
    );

    Ok(ProcessOutcome {
        session_id,
        csv_path,
        rows: records.len(),
    })
}

/// Process an upload already staged in memory (web uploads).
pub fn process_bytes(
    data: &[u8],
    format: SourceFormat,
    data_dir: &Path,
) -> Result<ProcessOutcome> {
    let session_id = Uuid::new_v4().to_string();
    let dir = session_dir(data_dir, &session_id);
    std::fs::create_dir_all(&dir)?;

    let raw_path = dir.join(format!("raw.{}", format.as_str()));
    std::fs::write(&raw_path, data)?;

    let table = parse_file(&raw_path, format)?;
    let records = normalize(&table);

    let csv_path = dir.join(CLEANED_CSV_NAME);
    export_cleaned_csv(&records, &csv_path)?;

    info!(
        "Processed {} byte upload ({} format): session {}, {} rows",
        data.len(),
        format,
        session_id,
        records.len()
    );

    Ok(ProcessOutcome {
        session_id,
        csv_path,
        rows: records.len(),
    })
}

/// Remove one session's store rows and files; returns rows removed
pub fn cleanup_session(db: &Database, data_dir: &Path, session_id: &str) -> Result<usize> {
    let deleted = db.delete_session(session_id)?;

    let dir = session_dir(data_dir, session_id);
    if dir.exists() {
        std::fs::remove_dir_all(&dir)?;
    }

    Ok(deleted)
}

/// Wipe the store and the whole upload directory; returns rows removed
pub fn cleanup_all(db: &Database, data_dir: &Path) -> Result<usize> {
    let deleted = db.delete_all()?;

    if data_dir.exists() {
        std::fs::remove_dir_all(data_dir)?;
    }
    std::fs::create_dir_all(data_dir)?;

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_statement_csv(dir: &Path) -> PathBuf {
        let path = dir.join("statement.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "Date,Particulars,Withdrawal,Deposit,Bal.").unwrap();
        writeln!(f, "2024-04-01,UPI/1/PAY/Amazon Store/HDFC,500,0,9500").unwrap();
        writeln!(f, "2024-04-02,NEFT SALARY,0,25000,34500").unwrap();
        writeln!(f, "garbage,no date here,,,").unwrap();
        path
    }

    #[test]
    fn test_process_file_creates_session_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("uploads");
        let stmt = write_statement_csv(dir.path());

        let outcome = process_file(&stmt, SourceFormat::Csv, &data_dir).unwrap();
        assert_eq!(outcome.rows, 2);

        let session = session_dir(&data_dir, &outcome.session_id);
        assert!(session.join("raw.csv").exists());
        assert!(outcome.csv_path.exists());
        assert_eq!(outcome.csv_path, session.join(CLEANED_CSV_NAME));
    }

    #[test]
    fn test_process_then_load_then_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("uploads");
        let stmt = write_statement_csv(dir.path());
        let db = Database::in_memory().unwrap();

        let outcome = process_file(&stmt, SourceFormat::Csv, &data_dir).unwrap();
        let loaded = db.load_session(&outcome.csv_path, &outcome.session_id).unwrap();
        assert_eq!(loaded, 2);

        let deleted = cleanup_session(&db, &data_dir, &outcome.session_id).unwrap();
        assert_eq!(deleted, 2);
        assert!(!session_dir(&data_dir, &outcome.session_id).exists());
    }

    #[test]
    fn test_process_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "Date,Desc,Dr,Cr\n2024-04-01,row,10,0\n";

        let outcome = process_bytes(csv.as_bytes(), SourceFormat::Csv, dir.path()).unwrap();
        assert_eq!(outcome.rows, 1);
        assert!(outcome.csv_path.exists());
    }

    #[test]
    fn test_cleanup_all_recreates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("uploads");
        let db = Database::in_memory().unwrap();

        let csv = "Date,Desc,Dr,Cr\n2024-04-01,row,10,0\n";
        let outcome = process_bytes(csv.as_bytes(), SourceFormat::Csv, &data_dir).unwrap();
        db.load_session(&outcome.csv_path, &outcome.session_id).unwrap();

        let deleted = cleanup_all(&db, &data_dir).unwrap();
        assert_eq!(deleted, 1);
        assert!(data_dir.exists());
        assert!(std::fs::read_dir(&data_dir).unwrap().next().is_none());
    }
}
