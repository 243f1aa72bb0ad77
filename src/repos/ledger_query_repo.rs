//! Repository for ledger reporting queries
//!
//! Read-only, bounded queries over posted journal lines. Only posted
//! entries ever contribute to a balance; drafts are invisible here.
//! Ordering is deterministic: entry_date, then entry_number, then line_no.

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use uuid::Uuid;

use crate::repos::account_repo::AccountType;

/// Errors that can occur during ledger query operations
#[derive(Debug, Error)]
pub enum LedgerQueryError {
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// One posted line for an account, joined with its entry header
#[derive(Debug, Clone, FromRow)]
pub struct LedgerLineRow {
    pub entry_id: Uuid,
    pub entry_date: NaiveDate,
    pub entry_number: String,
    pub description: String,
    pub line_no: i32,
    pub debit_minor: i64,
    pub credit_minor: i64,
}

/// Sum of all posted activity for an account strictly before `start`
///
/// This is the opening balance of a ledger view, as `debit - credit`
/// in minor units. Returns 0 when there is no prior activity.
pub async fn opening_balance_minor(
    pool: &PgPool,
    account_id: Uuid,
    start: NaiveDate,
) -> Result<i64, LedgerQueryError> {
    let opening = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COALESCE(SUM(jl.debit_minor - jl.credit_minor), 0)::BIGINT
        FROM journal_entry_lines jl
        INNER JOIN journal_entries je ON je.id = jl.journal_entry_id
        WHERE jl.account_id = $1
          AND je.is_posted
          AND je.entry_date < $2
        "#,
    )
    .bind(account_id)
    .bind(start)
    .fetch_one(pool)
    .await?;

    Ok(opening)
}

/// Query posted lines for an account within a date range (inclusive)
///
/// Line description falls back to the entry description when absent.
pub async fn query_ledger_lines(
    pool: &PgPool,
    account_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<LedgerLineRow>, LedgerQueryError> {
    if start > end {
        return Err(LedgerQueryError::InvalidDateRange { start, end });
    }

    let lines = sqlx::query_as::<_, LedgerLineRow>(
        r#"
        SELECT
            je.id as entry_id,
            je.entry_date,
            je.entry_number,
            COALESCE(jl.description, je.description) as description,
            jl.line_no,
            jl.debit_minor,
            jl.credit_minor
        FROM journal_entry_lines jl
        INNER JOIN journal_entries je ON je.id = jl.journal_entry_id
        WHERE jl.account_id = $1
          AND je.is_posted
          AND je.entry_date >= $2
          AND je.entry_date <= $3
        ORDER BY je.entry_date ASC, je.entry_number ASC, jl.line_no ASC
        "#,
    )
    .bind(account_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(lines)
}

/// Per-account debit/credit sums for the trial balance
#[derive(Debug, Clone, FromRow)]
pub struct AccountSumRow {
    pub account_id: Uuid,
    pub account_code: String,
    pub account_name: String,
    pub account_type: AccountType,
    pub debit_sum_minor: i64,
    pub credit_sum_minor: i64,
}

/// Group posted lines up to a cutoff date by account
///
/// Only active, non-header accounts participate; accounts with no posted
/// activity produce no row.
pub async fn query_account_sums(
    pool: &PgPool,
    as_of: NaiveDate,
) -> Result<Vec<AccountSumRow>, LedgerQueryError> {
    let rows = sqlx::query_as::<_, AccountSumRow>(
        r#"
        SELECT
            a.id as account_id,
            a.code as account_code,
            a.name as account_name,
            a.account_type,
            COALESCE(SUM(jl.debit_minor), 0)::BIGINT as debit_sum_minor,
            COALESCE(SUM(jl.credit_minor), 0)::BIGINT as credit_sum_minor
        FROM accounts a
        INNER JOIN journal_entry_lines jl ON jl.account_id = a.id
        INNER JOIN journal_entries je ON je.id = jl.journal_entry_id
        WHERE a.is_active
          AND NOT a.is_header
          AND je.is_posted
          AND je.entry_date <= $1
        GROUP BY a.id, a.code, a.name, a.account_type
        ORDER BY a.code ASC
        "#,
    )
    .bind(as_of)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
