//! LedgerLift Core Library
//!
//! Shared functionality for the LedgerLift statement ingestion tool:
//! - Statement parsers (CSV, spreadsheet, heuristic PDF extraction)
//! - Schema normalization into the canonical transaction shape
//! - Rule-based remarks classification (category, nature, counterparty)
//! - Session-scoped persistence into the fact table

pub mod classify;
pub mod db;
pub mod error;
pub mod models;
pub mod normalize;
pub mod parse;
pub mod pipeline;

pub use classify::{classify, detect_category, detect_nature, Enrichment};
pub use db::Database;
pub use error::{Error, Result};
pub use models::{
    CanonicalRecord, FactTransaction, SessionSummary, SourceFormat, TransactionCategory,
    TransactionMethod, TransactionNature, TransactionType,
};
pub use parse::{parse_file, parse_path, RawTable};
pub use pipeline::{process_bytes, process_file, ProcessOutcome};
