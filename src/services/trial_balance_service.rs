//! Trial Balance Service
//!
//! Computes, as of a cutoff date, every active non-header account's net
//! debit or credit position from the full posted-line history. Zero-net
//! accounts are excluded. Grand totals must reconcile; a mismatch is a
//! hard integrity error, never rounded away.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::repos::account_repo::AccountType;
use crate::repos::ledger_query_repo::{self, AccountSumRow, LedgerQueryError};
use crate::validation::is_balanced_minor;

/// Trial balance response with rows and reconciled totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceResponse {
    pub as_of: NaiveDate,
    pub rows: Vec<TrialBalanceRow>,
    pub totals: TrialBalanceTotals,
}

/// One account's net position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account_id: Uuid,
    pub account_code: String,
    pub account_name: String,
    pub account_type: AccountType,
    pub debit_balance_minor: i64,
    pub credit_balance_minor: i64,
}

/// Reconciled grand totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    pub total_debit_minor: i64,
    pub total_credit_minor: i64,
}

/// Errors that can occur during trial balance operations
#[derive(Debug, Error)]
pub enum TrialBalanceError {
    #[error("Ledger query error: {0}")]
    Query(#[from] LedgerQueryError),

    #[error(
        "Trial balance does not reconcile: debits {total_debit_minor} != credits {total_credit_minor}"
    )]
    OutOfBalance {
        total_debit_minor: i64,
        total_credit_minor: i64,
    },
}

/// Build trial balance rows from per-account sums
///
/// Each account's net (`debit - credit`) lands in exactly one column;
/// zero-net accounts are dropped. Fails with `OutOfBalance` when the
/// emitted totals disagree: given that every contributing entry balanced
/// individually, a mismatch signals an upstream bug or data corruption
/// and must reach the caller.
pub fn build_trial_balance(
    as_of: NaiveDate,
    sums: &[AccountSumRow],
) -> Result<TrialBalanceResponse, TrialBalanceError> {
    let mut rows: Vec<TrialBalanceRow> = Vec::with_capacity(sums.len());

    for sum in sums {
        let net = sum.debit_sum_minor - sum.credit_sum_minor;
        if net == 0 {
            continue;
        }

        rows.push(TrialBalanceRow {
            account_id: sum.account_id,
            account_code: sum.account_code.clone(),
            account_name: sum.account_name.clone(),
            account_type: sum.account_type,
            debit_balance_minor: net.max(0),
            credit_balance_minor: (-net).max(0),
        });
    }

    let total_debit_minor: i64 = rows.iter().map(|r| r.debit_balance_minor).sum();
    let total_credit_minor: i64 = rows.iter().map(|r| r.credit_balance_minor).sum();

    if !is_balanced_minor(total_debit_minor, total_credit_minor) {
        return Err(TrialBalanceError::OutOfBalance {
            total_debit_minor,
            total_credit_minor,
        });
    }

    Ok(TrialBalanceResponse {
        as_of,
        rows,
        totals: TrialBalanceTotals {
            total_debit_minor,
            total_credit_minor,
        },
    })
}

/// Get the trial balance as of a cutoff date
pub async fn get_trial_balance(
    pool: &PgPool,
    as_of: NaiveDate,
) -> Result<TrialBalanceResponse, TrialBalanceError> {
    let sums = ledger_query_repo::query_account_sums(pool, as_of).await?;
    let response = build_trial_balance(as_of, &sums)?;

    tracing::debug!(
        as_of = %as_of,
        rows = response.rows.len(),
        total_debit_minor = response.totals.total_debit_minor,
        "Trial balance computed"
    );

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(code: &str, account_type: AccountType, debit: i64, credit: i64) -> AccountSumRow {
        AccountSumRow {
            account_id: Uuid::new_v4(),
            account_code: code.to_string(),
            account_name: format!("Account {code}"),
            account_type,
            debit_sum_minor: debit,
            credit_sum_minor: credit,
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()
    }

    #[test]
    fn test_net_lands_in_one_column() {
        let sums = vec![
            sum("1000", AccountType::Asset, 150000, 50000),
            sum("4000", AccountType::Revenue, 0, 100000),
        ];

        let tb = build_trial_balance(as_of(), &sums).unwrap();

        assert_eq!(tb.rows[0].debit_balance_minor, 100000);
        assert_eq!(tb.rows[0].credit_balance_minor, 0);
        assert_eq!(tb.rows[1].debit_balance_minor, 0);
        assert_eq!(tb.rows[1].credit_balance_minor, 100000);
    }

    #[test]
    fn test_zero_net_accounts_excluded() {
        let sums = vec![
            sum("1000", AccountType::Asset, 70000, 70000),
            sum("1100", AccountType::Asset, 20000, 0),
            sum("2000", AccountType::Liability, 0, 20000),
        ];

        let tb = build_trial_balance(as_of(), &sums).unwrap();

        assert_eq!(tb.rows.len(), 2);
        assert!(tb.rows.iter().all(|r| r.account_code != "1000"));
    }

    #[test]
    fn test_totals_reconcile() {
        let sums = vec![
            sum("1000", AccountType::Asset, 30000, 0),
            sum("5000", AccountType::Expense, 12000, 0),
            sum("2000", AccountType::Liability, 0, 12000),
            sum("3000", AccountType::Equity, 0, 30000),
        ];

        let tb = build_trial_balance(as_of(), &sums).unwrap();

        assert_eq!(tb.totals.total_debit_minor, 42000);
        assert_eq!(tb.totals.total_credit_minor, 42000);
    }

    #[test]
    fn test_mismatch_is_a_hard_error() {
        // a one-sided sum can only come from a data-integrity bug
        let sums = vec![sum("1000", AccountType::Asset, 50000, 0)];

        let result = build_trial_balance(as_of(), &sums);

        match result {
            Err(TrialBalanceError::OutOfBalance {
                total_debit_minor,
                total_credit_minor,
            }) => {
                assert_eq!(total_debit_minor, 50000);
                assert_eq!(total_credit_minor, 0);
            }
            other => panic!("Expected OutOfBalance, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_reconciles_trivially() {
        let tb = build_trial_balance(as_of(), &[]).unwrap();
        assert!(tb.rows.is_empty());
        assert_eq!(tb.totals.total_debit_minor, 0);
        assert_eq!(tb.totals.total_credit_minor, 0);
    }
}
