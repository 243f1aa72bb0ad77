//! Journal entry lifecycle service: draft creation, draft editing, posting
//!
//! Drafts are freely editable; posting is a one-way transition that
//! stamps `posted_at` and freezes the entry. Every multi-row write runs
//! in a single transaction so no reader can observe a partial entry.

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::contracts::journal_draft_v1::JournalDraftV1;
use crate::repos::account_repo::{self, AccountError};
use crate::repos::journal_repo::{self, JournalEntry, JournalLine, JournalLineInsert};
use crate::validation::{is_balanced_minor, validate_journal_draft, ValidationError};

/// Errors that can occur during journal entry processing
#[derive(Debug, thiserror::Error)]
pub enum PostingError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid entry date: {0}")]
    InvalidDate(String),

    #[error("Journal entry not found: {0}")]
    EntryNotFound(Uuid),

    #[error("Journal entry already posted: {0}")]
    AlreadyPosted(Uuid),

    #[error("Entry is unbalanced: debits {debit_minor} != credits {credit_minor}")]
    Unbalanced { debit_minor: i64, credit_minor: i64 },
}

/// Result type for posting operations
pub type PostingResult<T> = Result<T, PostingError>;

/// Convert a currency-unit amount to minor units
pub fn to_minor(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Sum debit and credit minor units over an entry's lines
pub fn line_totals_minor(lines: &[JournalLine]) -> (i64, i64) {
    lines.iter().fold((0, 0), |(debit, credit), line| {
        (debit + line.debit_minor, credit + line.credit_minor)
    })
}

/// Create a draft journal entry from a submitted payload
///
/// Validates the payload, resolves each line's account (must exist, be
/// active and non-header), and inserts header + lines in one transaction.
pub async fn create_draft(pool: &PgPool, draft: &JournalDraftV1) -> PostingResult<Uuid> {
    validate_journal_draft(draft)?;
    let entry_date = parse_entry_date(&draft.entry_date)?;

    let mut tx = pool.begin().await?;

    let lines = resolve_draft_lines(&mut tx, draft).await?;

    let entry_id = Uuid::new_v4();
    let entry_number = journal_repo::next_entry_number(&mut tx).await?;

    journal_repo::insert_entry(
        &mut tx,
        entry_id,
        &entry_number,
        entry_date,
        &draft.description,
        &draft.source_module,
        false,
        None,
        None,
    )
    .await?;

    journal_repo::bulk_insert_lines(&mut tx, entry_id, lines).await?;

    tx.commit().await?;

    tracing::info!(
        entry_id = %entry_id,
        entry_number = %entry_number,
        source_module = %draft.source_module,
        "Draft journal entry created"
    );

    Ok(entry_id)
}

/// Replace an existing draft's header and lines
///
/// Fails with `AlreadyPosted` once the entry has been posted; posted
/// entries are immutable and corrections go through reversal. The state
/// check runs under the entry's row lock, so an edit racing a concurrent
/// post cannot rewrite lines the poster just validated.
pub async fn update_draft(
    pool: &PgPool,
    entry_id: Uuid,
    draft: &JournalDraftV1,
) -> PostingResult<()> {
    validate_journal_draft(draft)?;
    let entry_date = parse_entry_date(&draft.entry_date)?;

    let mut tx = pool.begin().await?;

    let entry = journal_repo::fetch_entry_for_update(&mut tx, entry_id)
        .await?
        .ok_or(PostingError::EntryNotFound(entry_id))?;
    ensure_editable(&entry)?;

    let lines = resolve_draft_lines(&mut tx, draft).await?;

    journal_repo::update_draft_header(
        &mut tx,
        entry_id,
        entry_date,
        &draft.description,
        &draft.source_module,
    )
    .await?;
    journal_repo::delete_lines(&mut tx, entry_id).await?;
    journal_repo::bulk_insert_lines(&mut tx, entry_id, lines).await?;

    tx.commit().await?;

    tracing::info!(entry_id = %entry_id, "Draft journal entry updated");

    Ok(())
}

/// Post a draft journal entry
///
/// Verifies the balance invariant over the stored lines, then flips
/// `is_posted`. The entry row is locked for the whole transaction: the
/// lines read here are the lines that post, and a concurrent poster or
/// draft editor waits for the lock and then sees `is_posted = true`.
pub async fn post_entry(pool: &PgPool, entry_id: Uuid) -> PostingResult<JournalEntry> {
    let mut tx = pool.begin().await?;

    let entry = journal_repo::fetch_entry_for_update(&mut tx, entry_id)
        .await?
        .ok_or(PostingError::EntryNotFound(entry_id))?;
    ensure_editable(&entry)?;

    let lines = journal_repo::fetch_lines_tx(&mut tx, entry_id).await?;

    let (debit_minor, credit_minor) = line_totals_minor(&lines);
    if !is_balanced_minor(debit_minor, credit_minor) {
        return Err(PostingError::Unbalanced {
            debit_minor,
            credit_minor,
        });
    }

    let transitioned = journal_repo::mark_posted(&mut tx, entry_id, Utc::now()).await?;
    if !transitioned {
        return Err(PostingError::AlreadyPosted(entry_id));
    }

    tx.commit().await?;

    tracing::info!(
        entry_id = %entry_id,
        entry_number = %entry.entry_number,
        debit_minor,
        credit_minor,
        "Journal entry posted"
    );

    journal_repo::fetch_entry(pool, entry_id)
        .await?
        .ok_or(PostingError::EntryNotFound(entry_id))
}

/// Posted entries are immutable; corrections go through reversal
fn ensure_editable(entry: &JournalEntry) -> PostingResult<()> {
    if entry.is_posted {
        return Err(PostingError::AlreadyPosted(entry.id));
    }
    Ok(())
}

fn parse_entry_date(raw: &str) -> PostingResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| PostingError::InvalidDate(format!("{raw}: {e}")))
}

async fn resolve_draft_lines(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    draft: &JournalDraftV1,
) -> PostingResult<Vec<JournalLineInsert>> {
    let mut lines = Vec::with_capacity(draft.lines.len());

    for (idx, line) in draft.lines.iter().enumerate() {
        let account = account_repo::find_postable_by_code_tx(tx, &line.account_code).await?;

        lines.push(JournalLineInsert {
            line_no: (idx + 1) as i32,
            account_id: account.id,
            debit_minor: to_minor(line.debit),
            credit_minor: to_minor(line.credit),
            description: line.description.clone(),
        });
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(debit_minor: i64, credit_minor: i64) -> JournalLine {
        JournalLine {
            id: Uuid::new_v4(),
            journal_entry_id: Uuid::new_v4(),
            line_no: 1,
            account_id: Uuid::new_v4(),
            debit_minor,
            credit_minor,
            description: None,
        }
    }

    #[test]
    fn test_to_minor_rounds_to_cents() {
        assert_eq!(to_minor(100.0), 10000);
        assert_eq!(to_minor(0.01), 1);
        assert_eq!(to_minor(33.335), 3334);
        assert_eq!(to_minor(0.0), 0);
    }

    #[test]
    fn test_line_totals() {
        let lines = vec![line(10000, 0), line(0, 9000), line(0, 1000)];
        assert_eq!(line_totals_minor(&lines), (10000, 10000));
    }

    #[test]
    fn test_balanced_within_one_minor_unit() {
        assert!(is_balanced_minor(10000, 10000));
        assert!(is_balanced_minor(10000, 10001));
        assert!(!is_balanced_minor(10000, 10002));
    }

    fn entry(is_posted: bool) -> JournalEntry {
        JournalEntry {
            id: Uuid::new_v4(),
            entry_number: "JE-000042".to_string(),
            entry_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            description: "Cash sale".to_string(),
            source_module: "manual".to_string(),
            is_posted,
            is_reversed: false,
            posted_at: is_posted.then(Utc::now),
            reverses_entry_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_draft_entry_is_editable() {
        assert!(ensure_editable(&entry(false)).is_ok());
    }

    #[test]
    fn test_posted_entry_is_immutable() {
        // the same guard gates draft edits and double-posting, evaluated
        // under the entry's row lock
        let posted = entry(true);
        match ensure_editable(&posted) {
            Err(PostingError::AlreadyPosted(id)) => assert_eq!(id, posted.id),
            other => panic!("Expected AlreadyPosted, got {other:?}"),
        }
    }

    #[test]
    fn test_posting_error_display() {
        let err = PostingError::Unbalanced {
            debit_minor: 10000,
            credit_minor: 9000,
        };
        assert!(err.to_string().contains("10000"));
        assert!(err.to_string().contains("9000"));
    }
}
