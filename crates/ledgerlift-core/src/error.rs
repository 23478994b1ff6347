//! Error types for LedgerLift

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("PDF extraction error: {0}")]
    Pdf(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Load error: {0}")]
    Load(String),
}

pub type Result<T> = std::result::Result<T, Error>;
