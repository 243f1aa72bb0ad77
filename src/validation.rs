//! Validation logic for journal entry drafts
//!
//! Enforces the double-entry contract on incoming drafts before any
//! write occurs: structural checks per line, and the balance invariant
//! over the whole entry.

use crate::contracts::journal_draft_v1::{DraftLine, JournalDraftV1};
use thiserror::Error;

/// Balance tolerance in currency units (penny precision)
pub const BALANCE_EPSILON: f64 = 0.01;

/// Validation errors for journal entry drafts
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Entry date must be ISO format (YYYY-MM-DD), got: {0}")]
    InvalidEntryDate(String),

    #[error("Description must be between 1 and 500 characters, got {0} characters")]
    InvalidDescriptionLength(usize),

    #[error("Lines must have at least 2 items, got {0}")]
    InsufficientLines(usize),

    #[error("Line {0}: account_code cannot be empty")]
    EmptyAccountCode(usize),

    #[error("Line {0}: debit must be non-negative, got {1}")]
    NegativeDebit(usize, f64),

    #[error("Line {0}: credit must be non-negative, got {1}")]
    NegativeCredit(usize, f64),

    #[error("Line {0}: description exceeds 500 characters, got {1}")]
    LineDescriptionTooLong(usize, usize),

    #[error("Total debits ({0}) must equal total credits ({1})")]
    UnbalancedEntry(f64, f64),
}

/// Validate a journal entry draft
///
/// # Validation Rules
///
/// - `entry_date`: Must parse as YYYY-MM-DD
/// - `description`: Must be 1-500 characters
/// - `lines`: Must have at least 2 items
/// - Each line:
///   - `account_code`: Must be non-empty
///   - `debit`: Must be >= 0
///   - `credit`: Must be >= 0
///   - `description`: If present, must be <= 500 characters
/// - Total debits must equal total credits within [`BALANCE_EPSILON`]
///
/// # Errors
///
/// Returns `ValidationError` if any validation rule is violated
pub fn validate_journal_draft(draft: &JournalDraftV1) -> Result<(), ValidationError> {
    if chrono::NaiveDate::parse_from_str(&draft.entry_date, "%Y-%m-%d").is_err() {
        return Err(ValidationError::InvalidEntryDate(draft.entry_date.clone()));
    }

    // limits are in characters, not bytes
    let desc_len = draft.description.chars().count();
    if desc_len == 0 || desc_len > 500 {
        return Err(ValidationError::InvalidDescriptionLength(desc_len));
    }

    if draft.lines.len() < 2 {
        return Err(ValidationError::InsufficientLines(draft.lines.len()));
    }

    let mut total_debits = 0.0;
    let mut total_credits = 0.0;

    for (idx, line) in draft.lines.iter().enumerate() {
        validate_draft_line(line, idx)?;
        total_debits += line.debit;
        total_credits += line.credit;
    }

    if !is_balanced(total_debits, total_credits) {
        return Err(ValidationError::UnbalancedEntry(total_debits, total_credits));
    }

    Ok(())
}

/// Check the balance invariant on already-summed totals
pub fn is_balanced(total_debits: f64, total_credits: f64) -> bool {
    (total_debits - total_credits).abs() <= BALANCE_EPSILON
}

/// Balance check over minor-unit sums; 1 minor unit == 0.01 currency units
pub fn is_balanced_minor(total_debit_minor: i64, total_credit_minor: i64) -> bool {
    (total_debit_minor - total_credit_minor).abs() <= 1
}

/// Validate a single draft line
fn validate_draft_line(line: &DraftLine, index: usize) -> Result<(), ValidationError> {
    if line.account_code.is_empty() {
        return Err(ValidationError::EmptyAccountCode(index));
    }

    if line.debit < 0.0 {
        return Err(ValidationError::NegativeDebit(index, line.debit));
    }

    if line.credit < 0.0 {
        return Err(ValidationError::NegativeCredit(index, line.credit));
    }

    if let Some(ref desc) = line.description {
        let desc_len = desc.chars().count();
        if desc_len > 500 {
            return Err(ValidationError::LineDescriptionTooLong(index, desc_len));
        }
    }

    Ok(())
}
