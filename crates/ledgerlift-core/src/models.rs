//! Domain models for LedgerLift

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Supported statement file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Csv,
    Xls,
    Xlsx,
    Pdf,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xls => "xls",
            Self::Xlsx => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    /// Detect the format from a file extension ("csv", ".CSV", ...)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xls" => Some(Self::Xls),
            "xlsx" => Some(Self::Xlsx),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| format!("Unsupported format: {}", s))
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sign-derived transaction type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Credit,
    Debit,
    Neutral,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "Credit",
            Self::Debit => "Debit",
            Self::Neutral => "Neutral",
        }
    }

    /// Credit if credit > 0, Debit if debit > 0, otherwise Neutral.
    pub fn from_amounts(debit: f64, credit: f64) -> Self {
        if credit > 0.0 {
            Self::Credit
        } else if debit > 0.0 {
            Self::Debit
        } else {
            Self::Neutral
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            "neutral" => Ok(Self::Neutral),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// INCOME/EXPENSE/TRANSFER classification derived from debit/credit signs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionNature {
    Income,
    Expense,
    Transfer,
}

impl TransactionNature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
        }
    }
}

impl std::fmt::Display for TransactionNature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the transaction moved: UPI rails or plain bank transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionMethod {
    Upi,
    Bank,
}

impl TransactionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "UPI",
            Self::Bank => "BANK",
        }
    }
}

impl std::fmt::Display for TransactionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spending category derived from remarks keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionCategory {
    Emi,
    Food,
    Shopping,
    Utility,
    Medical,
    Investment,
    Transfer,
    Refund,
    Other,
}

impl TransactionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emi => "EMI",
            Self::Food => "FOOD",
            Self::Shopping => "SHOPPING",
            Self::Utility => "UTILITY",
            Self::Medical => "MEDICAL",
            Self::Investment => "INVESTMENT",
            Self::Transfer => "TRANSFER",
            Self::Refund => "REFUND",
            Self::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One normalized statement row, before classification
///
/// `net_amount` and `transaction_type` are only present when the source
/// table carried both a debit and a credit column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub transaction_date: NaiveDate,
    pub remarks: String,
    pub debit: f64,
    pub credit: f64,
    pub balance: f64,
    pub net_amount: Option<f64>,
    pub transaction_type: Option<TransactionType>,
}

/// A persisted fact row: canonical fields plus classifier outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactTransaction {
    pub txn_id: i64,
    pub session_id: String,
    pub txn_date: NaiveDate,
    pub transaction_ref_id: Option<String>,
    pub transaction_code: String,
    pub transaction_method: String,
    pub transaction_category: String,
    pub transaction_nature: String,
    pub counterparty_name: String,
    pub counterparty_bank_code: String,
    pub debit: f64,
    pub credit: f64,
    pub amount: f64,
    pub balance: f64,
    pub remarks: String,
    pub created_at: DateTime<Utc>,
}

/// Per-session rollup for the sessions listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub record_count: i64,
    pub first_txn_date: Option<NaiveDate>,
    pub last_txn_date: Option<NaiveDate>,
}
