//! Ledger Balance Service
//!
//! Computes an account's ledger view over a date range: opening balance
//! (net of all posted activity before the range), a running balance per
//! line through the range, and the closing balance. Balances are always
//! recomputed from posted lines; nothing is stored incrementally.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::repos::account_repo::{self, AccountError};
use crate::repos::ledger_query_repo::{self, LedgerLineRow, LedgerQueryError};

/// Ledger view response DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerResponse {
    pub account_id: Uuid,
    pub account_code: String,
    pub account_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub opening_balance_minor: i64,
    pub rows: Vec<LedgerRow>,
    pub closing_balance_minor: i64,
}

/// One ledger row: a posted line with its running balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub entry_date: NaiveDate,
    pub entry_number: String,
    pub description: String,
    pub debit_minor: i64,
    pub credit_minor: i64,
    pub running_balance_minor: i64,
}

/// Errors that can occur during ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    #[error("Account repository error: {0}")]
    Account(#[from] AccountError),

    #[error("Ledger query error: {0}")]
    Query(#[from] LedgerQueryError),
}

/// Fold posted lines into running balances
///
/// The running balance starts at the opening balance and accumulates
/// `debit - credit` per line in order. Returns the rows and the closing
/// balance (the opening balance when no lines are in range). The math is
/// sign-type-agnostic: presentation layers flip signs per account type.
pub fn compute_running_balances(
    opening_minor: i64,
    lines: &[LedgerLineRow],
) -> (Vec<LedgerRow>, i64) {
    let mut running = opening_minor;
    let rows = lines
        .iter()
        .map(|line| {
            running += line.debit_minor - line.credit_minor;
            LedgerRow {
                entry_date: line.entry_date,
                entry_number: line.entry_number.clone(),
                description: line.description.clone(),
                debit_minor: line.debit_minor,
                credit_minor: line.credit_minor,
                running_balance_minor: running,
            }
        })
        .collect();

    (rows, running)
}

/// Get the ledger view for an account over an inclusive date range
pub async fn get_account_ledger(
    pool: &PgPool,
    account_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<LedgerResponse, LedgerError> {
    let account = account_repo::find_by_id(pool, account_id)
        .await?
        .ok_or(LedgerError::AccountNotFound(account_id))?;

    let opening_minor =
        ledger_query_repo::opening_balance_minor(pool, account_id, start_date).await?;
    let lines = ledger_query_repo::query_ledger_lines(pool, account_id, start_date, end_date).await?;

    let (rows, closing_minor) = compute_running_balances(opening_minor, &lines);

    Ok(LedgerResponse {
        account_id,
        account_code: account.code,
        account_name: account.name,
        start_date,
        end_date,
        opening_balance_minor: opening_minor,
        rows,
        closing_balance_minor: closing_minor,
    })
}
