//! Journal entry draft contract (v1)
//!
//! Request payload for creating or replacing a draft journal entry.
//! Amounts are expressed in currency units (f64) at this boundary and
//! converted to minor units on insert.

use serde::{Deserialize, Serialize};

/// A draft journal entry as submitted by a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalDraftV1 {
    /// Entry date, ISO format (YYYY-MM-DD)
    pub entry_date: String,
    /// Entry-level description (1-500 characters)
    pub description: String,
    /// Originating module tag (e.g. "manual", "sales", "purchases")
    #[serde(default = "default_source_module")]
    pub source_module: String,
    /// Debit/credit legs (minimum 2)
    pub lines: Vec<DraftLine>,
}

/// One debit or credit leg of a draft entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftLine {
    /// Chart of Accounts code (e.g. "1100")
    pub account_code: String,
    /// Debit amount in currency units, >= 0
    #[serde(default)]
    pub debit: f64,
    /// Credit amount in currency units, >= 0
    #[serde(default)]
    pub credit: f64,
    /// Line-level description; falls back to the entry description when absent
    pub description: Option<String>,
}

fn default_source_module() -> String {
    "manual".to_string()
}
