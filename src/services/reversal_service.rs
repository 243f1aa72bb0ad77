//! Reversal service for creating inverse journal entries
//!
//! A reversal is a brand-new posted entry whose lines are the original's
//! with debit and credit swapped, linked back via `reverses_entry_id`.
//! Creating the reversal and flagging the original happen in one
//! transaction: both land or neither does.

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::journal_repo::{self, JournalLine, JournalLineInsert};

/// Errors that can occur during reversal operations
#[derive(Debug, thiserror::Error)]
pub enum ReversalError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Original entry not found: {0}")]
    EntryNotFound(Uuid),

    #[error("Entry is not posted and cannot be reversed: {0}")]
    NotPosted(Uuid),

    #[error("Entry already reversed: {0}")]
    AlreadyReversed(Uuid),
}

/// Result type for reversal operations
pub type ReversalResult<T> = Result<T, ReversalError>;

/// Build reversal line inserts by swapping each line's debit and credit
///
/// Line numbers and accounts are preserved, so the reversal of a balanced
/// entry is itself balanced by construction.
pub fn swap_lines(original_lines: &[JournalLine]) -> Vec<JournalLineInsert> {
    original_lines
        .iter()
        .map(|line| JournalLineInsert {
            line_no: line.line_no,
            account_id: line.account_id,
            debit_minor: line.credit_minor,
            credit_minor: line.debit_minor,
            description: line.description.clone(),
        })
        .collect()
}

/// Create a reversal entry for a posted journal entry
///
/// The reversal is posted immediately with source module "reversal" and
/// `reverses_entry_id` pointing at the original; the original is flagged
/// `is_reversed` in the same transaction.
pub async fn create_reversal(
    pool: &PgPool,
    original_entry_id: Uuid,
    reversal_date: NaiveDate,
    description: &str,
) -> ReversalResult<Uuid> {
    let (original_entry, original_lines) =
        journal_repo::fetch_entry_with_lines(pool, original_entry_id)
            .await?
            .ok_or(ReversalError::EntryNotFound(original_entry_id))?;

    if !original_entry.is_posted {
        return Err(ReversalError::NotPosted(original_entry_id));
    }

    if original_entry.is_reversed {
        return Err(ReversalError::AlreadyReversed(original_entry_id));
    }

    let mut tx = pool.begin().await?;

    // Flag first, with the state guard: if a concurrent reversal got here
    // between our read and this update, rows_affected is 0 and we bail
    // before writing anything else.
    let flagged = journal_repo::mark_reversed(&mut tx, original_entry_id).await?;
    if !flagged {
        return Err(ReversalError::AlreadyReversed(original_entry_id));
    }

    let reversal_entry_id = Uuid::new_v4();
    let entry_number = journal_repo::next_entry_number(&mut tx).await?;

    journal_repo::insert_entry(
        &mut tx,
        reversal_entry_id,
        &entry_number,
        reversal_date,
        description,
        "reversal",
        true,
        Some(Utc::now()),
        Some(original_entry_id),
    )
    .await?;

    journal_repo::bulk_insert_lines(&mut tx, reversal_entry_id, swap_lines(&original_lines))
        .await?;

    tx.commit().await?;

    tracing::info!(
        reversal_entry_id = %reversal_entry_id,
        entry_number = %entry_number,
        original_entry_id = %original_entry_id,
        original_entry_number = %original_entry.entry_number,
        "Reversal entry created"
    );

    Ok(reversal_entry_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(line_no: i32, debit_minor: i64, credit_minor: i64) -> JournalLine {
        JournalLine {
            id: Uuid::new_v4(),
            journal_entry_id: Uuid::new_v4(),
            line_no,
            account_id: Uuid::from_u128(line_no as u128),
            debit_minor,
            credit_minor,
            description: Some(format!("line {line_no}")),
        }
    }

    #[test]
    fn test_swap_lines_inverts_each_leg() {
        let original = vec![line(1, 20000, 0), line(2, 0, 20000)];

        let swapped = swap_lines(&original);

        assert_eq!(swapped[0].debit_minor, 0);
        assert_eq!(swapped[0].credit_minor, 20000);
        assert_eq!(swapped[1].debit_minor, 20000);
        assert_eq!(swapped[1].credit_minor, 0);
    }

    #[test]
    fn test_swap_preserves_accounts_and_line_numbers() {
        let original = vec![line(1, 5000, 0), line(2, 0, 3000), line(3, 0, 2000)];

        let swapped = swap_lines(&original);

        for (orig, rev) in original.iter().zip(&swapped) {
            assert_eq!(orig.line_no, rev.line_no);
            assert_eq!(orig.account_id, rev.account_id);
            assert_eq!(orig.description, rev.description);
        }
    }

    #[test]
    fn test_swapped_entry_stays_balanced() {
        let original = vec![line(1, 7500, 0), line(2, 0, 2500), line(3, 0, 5000)];

        let swapped = swap_lines(&original);

        let debit: i64 = swapped.iter().map(|l| l.debit_minor).sum();
        let credit: i64 = swapped.iter().map(|l| l.credit_minor).sum();
        assert_eq!(debit, credit);
    }

    #[test]
    fn test_reversal_error_display() {
        let err = ReversalError::NotPosted(Uuid::new_v4());
        assert!(err.to_string().contains("not posted"));
    }
}
