use chrono::NaiveDate;
use uuid::Uuid;

use ledger_rs::repos::account_repo::AccountType;
use ledger_rs::repos::ledger_query_repo::AccountSumRow;
use ledger_rs::services::trial_balance_service::{build_trial_balance, TrialBalanceError};

fn sums(code: &str, account_type: AccountType, debit: i64, credit: i64) -> AccountSumRow {
    AccountSumRow {
        account_id: Uuid::new_v4(),
        account_code: code.to_string(),
        account_name: format!("Account {code}"),
        account_type,
        debit_sum_minor: debit,
        credit_sum_minor: credit,
    }
}

fn cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
}

#[test]
fn test_reconciles_for_balanced_history() {
    // history equivalent to two posted entries:
    //   cash 1000 / revenue 1000, expense 400 / cash 400
    let rows = vec![
        sums("1000", AccountType::Asset, 100000, 40000),
        sums("4000", AccountType::Revenue, 0, 100000),
        sums("5000", AccountType::Expense, 40000, 0),
    ];

    let tb = build_trial_balance(cutoff(), &rows).unwrap();

    assert_eq!(tb.totals.total_debit_minor, tb.totals.total_credit_minor);
    assert_eq!(tb.totals.total_debit_minor, 100000);
}

#[test]
fn test_net_position_single_column() {
    let rows = vec![
        sums("1000", AccountType::Asset, 80000, 30000),
        sums("2000", AccountType::Liability, 10000, 60000),
    ];

    let tb = build_trial_balance(cutoff(), &rows).unwrap();

    let cash = tb.rows.iter().find(|r| r.account_code == "1000").unwrap();
    assert_eq!(cash.debit_balance_minor, 50000);
    assert_eq!(cash.credit_balance_minor, 0);

    let payable = tb.rows.iter().find(|r| r.account_code == "2000").unwrap();
    assert_eq!(payable.debit_balance_minor, 0);
    assert_eq!(payable.credit_balance_minor, 50000);
}

#[test]
fn test_zero_net_accounts_dropped() {
    let rows = vec![
        sums("1000", AccountType::Asset, 25000, 25000),
        sums("1100", AccountType::Asset, 5000, 0),
        sums("3000", AccountType::Equity, 0, 5000),
    ];

    let tb = build_trial_balance(cutoff(), &rows).unwrap();

    assert_eq!(tb.rows.len(), 2);
    assert!(!tb.rows.iter().any(|r| r.account_code == "1000"));
}

#[test]
fn test_cogs_participates_like_any_debit_account() {
    let rows = vec![
        sums("5100", AccountType::Cogs, 32000, 0),
        sums("1300", AccountType::Asset, 0, 32000),
    ];

    let tb = build_trial_balance(cutoff(), &rows).unwrap();

    let cogs = tb.rows.iter().find(|r| r.account_code == "5100").unwrap();
    assert_eq!(cogs.debit_balance_minor, 32000);
    assert_eq!(tb.totals.total_debit_minor, 32000);
    assert_eq!(tb.totals.total_credit_minor, 32000);
}

#[test]
fn test_out_of_balance_surfaces_as_error() {
    // only one side of an entry present: integrity bug upstream
    let rows = vec![
        sums("1000", AccountType::Asset, 90000, 0),
        sums("4000", AccountType::Revenue, 0, 70000),
    ];

    let result = build_trial_balance(cutoff(), &rows);

    match result {
        Err(TrialBalanceError::OutOfBalance {
            total_debit_minor,
            total_credit_minor,
        }) => {
            assert_eq!(total_debit_minor, 90000);
            assert_eq!(total_credit_minor, 70000);
        }
        other => panic!("Expected OutOfBalance, got {other:?}"),
    }
}

#[test]
fn test_one_minor_unit_rounding_tolerated() {
    let rows = vec![
        sums("1000", AccountType::Asset, 10001, 0),
        sums("4000", AccountType::Revenue, 0, 10000),
    ];

    let tb = build_trial_balance(cutoff(), &rows).unwrap();

    assert_eq!(tb.totals.total_debit_minor, 10001);
    assert_eq!(tb.totals.total_credit_minor, 10000);
}
