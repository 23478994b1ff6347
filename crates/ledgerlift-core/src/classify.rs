//! Rule-based remarks classification
//!
//! Every function here is pure and deterministic: the same remarks
//! string (plus debit/credit for nature) always yields the same
//! outputs, in any call order. Rule tables are ordered const slices
//! because iteration order is a tie-break contract, not an accident.

use crate::models::{TransactionCategory, TransactionMethod, TransactionNature};

/// Ordered category rules: the first category with any substring-matching
/// keyword wins.
pub const CATEGORY_RULES: &[(TransactionCategory, &[&str])] = &[
    (TransactionCategory::Emi, &["emi"]),
    (TransactionCategory::Food, &["hotel", "food", "restaurant"]),
    (TransactionCategory::Shopping, &["amazon", "flipkart", "mall"]),
    (
        TransactionCategory::Utility,
        &["electric", "mobile", "bill", "recharge"],
    ),
    (TransactionCategory::Medical, &["hospital", "medical"]),
    (
        TransactionCategory::Investment,
        &["mutual", "sip", "policy", "lic"],
    ),
    (TransactionCategory::Transfer, &["transfer", "self"]),
    (TransactionCategory::Refund, &["refund"]),
];

/// Known counterparty bank codes, in scan order
pub const BANK_CODES: &[&str] = &["BOI", "HDFC", "SBI", "AXIS", "ICICI", "YES", "KOTAK"];

/// Sentinel for fields the remarks string does not carry
pub const UNKNOWN: &str = "UNKNOWN";

/// Classifier outputs for one remarks string
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub transaction_ref_id: Option<String>,
    pub transaction_code: String,
    pub transaction_method: TransactionMethod,
    pub transaction_category: TransactionCategory,
    pub transaction_nature: TransactionNature,
    pub counterparty_name: String,
    pub counterparty_bank_code: String,
}

/// Classify one transaction from its remarks and amounts.
///
/// Positional `/`-segment extraction is authoritative for the bank code
/// here; [`scan_bank_code`] is the legacy whitelist scan.
///
/// Segments are trimmed, and a segment that is empty after trimming
/// counts as absent rather than as an empty value: `"UPI//PAY//HDFC"`
/// yields no reference id and an UNKNOWN counterparty, not empty
/// strings.
pub fn classify(remarks: &str, debit: f64, credit: f64) -> Enrichment {
    let segments: Vec<&str> = if remarks.is_empty() {
        Vec::new()
    } else {
        remarks.split('/').collect()
    };

    let segment = |i: usize| segments.get(i).map(|s| s.trim()).filter(|s| !s.is_empty());

    let transaction_code = segment(0).unwrap_or(UNKNOWN).to_string();

    Enrichment {
        transaction_ref_id: segment(1).map(|s| s.to_string()),
        transaction_method: detect_method(&transaction_code),
        transaction_category: detect_category(remarks),
        transaction_nature: detect_nature(debit, credit),
        counterparty_name: segment(3).unwrap_or(UNKNOWN).to_string(),
        counterparty_bank_code: segment(4).unwrap_or(UNKNOWN).to_string(),
        transaction_code,
    }
}

/// UPI if "UPI" appears in the transaction code (case-insensitive),
/// otherwise BANK.
pub fn detect_method(transaction_code: &str) -> TransactionMethod {
    if transaction_code.to_uppercase().contains("UPI") {
        TransactionMethod::Upi
    } else {
        TransactionMethod::Bank
    }
}

/// First category whose any keyword is a substring of the lowercased
/// remarks; OTHER when nothing matches.
pub fn detect_category(remarks: &str) -> TransactionCategory {
    let r = remarks.to_lowercase();
    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|k| r.contains(k)) {
            return *category;
        }
    }
    TransactionCategory::Other
}

/// INCOME iff credit>0 and debit==0, EXPENSE iff debit>0 and credit==0,
/// else TRANSFER.
pub fn detect_nature(debit: f64, credit: f64) -> TransactionNature {
    if credit > 0.0 && debit == 0.0 {
        TransactionNature::Income
    } else if debit > 0.0 && credit == 0.0 {
        TransactionNature::Expense
    } else {
        TransactionNature::Transfer
    }
}

/// Legacy bank-code extraction: scan the uppercased remarks for
/// `/<CODE>/` against the whitelist, first match wins.
///
/// Kept as an alternate path for malformed remarks where the positional
/// fifth segment is absent; the load path uses the positional strategy.
pub fn scan_bank_code(remarks: &str) -> &'static str {
    let upper = remarks.to_uppercase();
    for code in BANK_CODES {
        if upper.contains(&format!("/{}/", code)) {
            return code;
        }
    }
    UNKNOWN
}
