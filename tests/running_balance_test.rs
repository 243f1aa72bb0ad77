use chrono::NaiveDate;
use uuid::Uuid;

use ledger_rs::repos::ledger_query_repo::LedgerLineRow;
use ledger_rs::services::ledger_service::compute_running_balances;

fn line(
    year: i32,
    month: u32,
    day: u32,
    entry_number: &str,
    debit_minor: i64,
    credit_minor: i64,
) -> LedgerLineRow {
    LedgerLineRow {
        entry_id: Uuid::new_v4(),
        entry_date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        entry_number: entry_number.to_string(),
        description: "posted line".to_string(),
        line_no: 1,
        debit_minor,
        credit_minor,
    }
}

#[test]
fn test_opening_then_debit_then_credit() {
    // opening 300.00; +50.00 debit; -20.00 credit
    let lines = vec![
        line(2026, 4, 2, "JE-000021", 5000, 0),
        line(2026, 4, 9, "JE-000022", 0, 2000),
    ];

    let (rows, closing) = compute_running_balances(30000, &lines);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].running_balance_minor, 35000);
    assert_eq!(rows[1].running_balance_minor, 33000);
    assert_eq!(closing, 33000);
}

#[test]
fn test_closing_equals_opening_plus_range_net() {
    let lines = vec![
        line(2026, 1, 3, "JE-000001", 120000, 0),
        line(2026, 1, 3, "JE-000002", 0, 45000),
        line(2026, 1, 15, "JE-000003", 0, 5000),
        line(2026, 2, 1, "JE-000004", 30000, 0),
    ];
    let opening = 7500;

    let (rows, closing) = compute_running_balances(opening, &lines);

    let range_net: i64 = lines.iter().map(|l| l.debit_minor - l.credit_minor).sum();
    assert_eq!(closing, opening + range_net);
    assert_eq!(rows.last().unwrap().running_balance_minor, closing);

    // continuity: every row is the previous row plus its own net
    let mut previous = opening;
    for row in &rows {
        assert_eq!(
            row.running_balance_minor,
            previous + row.debit_minor - row.credit_minor
        );
        previous = row.running_balance_minor;
    }
}

#[test]
fn test_empty_range_closing_is_opening() {
    let (rows, closing) = compute_running_balances(-8200, &[]);

    assert!(rows.is_empty());
    assert_eq!(closing, -8200);
}

#[test]
fn test_sign_type_agnostic_math() {
    // a revenue account accumulates credits; the calculator still
    // reports debit - credit and leaves sign flips to presentation
    let lines = vec![
        line(2026, 5, 1, "JE-000030", 0, 40000),
        line(2026, 5, 2, "JE-000031", 0, 25000),
        line(2026, 5, 20, "JE-000032", 10000, 0),
    ];

    let (rows, closing) = compute_running_balances(0, &lines);

    assert_eq!(rows[0].running_balance_minor, -40000);
    assert_eq!(rows[1].running_balance_minor, -65000);
    assert_eq!(rows[2].running_balance_minor, -55000);
    assert_eq!(closing, -55000);
}

#[test]
fn test_rows_carry_entry_metadata() {
    let lines = vec![line(2026, 7, 4, "JE-000100", 1500, 0)];

    let (rows, _) = compute_running_balances(0, &lines);

    assert_eq!(rows[0].entry_number, "JE-000100");
    assert_eq!(rows[0].entry_date, NaiveDate::from_ymd_opt(2026, 7, 4).unwrap());
    assert_eq!(rows[0].description, "posted line");
    assert_eq!(rows[0].debit_minor, 1500);
    assert_eq!(rows[0].credit_minor, 0);
}
