use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Journal entry header (for reading from DB)
#[derive(Debug, Clone, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub entry_number: String,
    pub entry_date: NaiveDate,
    pub description: String,
    pub source_module: String,
    pub is_posted: bool,
    pub is_reversed: bool,
    pub posted_at: Option<DateTime<Utc>>,
    pub reverses_entry_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Journal line (for reading from DB)
#[derive(Debug, Clone, FromRow)]
pub struct JournalLine {
    pub id: Uuid,
    pub journal_entry_id: Uuid,
    pub line_no: i32,
    pub account_id: Uuid,
    pub debit_minor: i64,
    pub credit_minor: i64,
    pub description: Option<String>,
}

/// Struct for inserting a journal line
#[derive(Debug, Clone)]
pub struct JournalLineInsert {
    pub line_no: i32,
    pub account_id: Uuid,
    pub debit_minor: i64,
    pub credit_minor: i64,
    pub description: Option<String>,
}

const ENTRY_COLUMNS: &str = "id, entry_number, entry_date, description, source_module, \
                             is_posted, is_reversed, posted_at, reverses_entry_id, created_at";

/// Allocate the next human-readable entry number from the DB sequence
pub async fn next_entry_number(tx: &mut Transaction<'_, Postgres>) -> Result<String, sqlx::Error> {
    let seq: i64 = sqlx::query_scalar("SELECT nextval('journal_entry_number_seq')")
        .fetch_one(&mut **tx)
        .await?;

    Ok(format!("JE-{:06}", seq))
}

/// Insert a journal entry header
#[allow(clippy::too_many_arguments)]
pub async fn insert_entry(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: Uuid,
    entry_number: &str,
    entry_date: NaiveDate,
    description: &str,
    source_module: &str,
    is_posted: bool,
    posted_at: Option<DateTime<Utc>>,
    reverses_entry_id: Option<Uuid>,
) -> Result<Uuid, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO journal_entries
            (id, entry_number, entry_date, description, source_module,
             is_posted, is_reversed, posted_at, reverses_entry_id)
        VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, $8)
        "#,
    )
    .bind(entry_id)
    .bind(entry_number)
    .bind(entry_date)
    .bind(description)
    .bind(source_module)
    .bind(is_posted)
    .bind(posted_at)
    .bind(reverses_entry_id)
    .execute(&mut **tx)
    .await?;

    Ok(entry_id)
}

/// Bulk insert journal lines for a journal entry
pub async fn bulk_insert_lines(
    tx: &mut Transaction<'_, Postgres>,
    journal_entry_id: Uuid,
    lines: Vec<JournalLineInsert>,
) -> Result<(), sqlx::Error> {
    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO journal_entry_lines
                (id, journal_entry_id, line_no, account_id, debit_minor, credit_minor, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(journal_entry_id)
        .bind(line.line_no)
        .bind(line.account_id)
        .bind(line.debit_minor)
        .bind(line.credit_minor)
        .bind(&line.description)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Fetch a journal entry header by ID
pub async fn fetch_entry(pool: &PgPool, entry_id: Uuid) -> Result<Option<JournalEntry>, sqlx::Error> {
    sqlx::query_as::<_, JournalEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM journal_entries WHERE id = $1"
    ))
    .bind(entry_id)
    .fetch_optional(pool)
    .await
}

/// Fetch a journal entry header inside a transaction, locking the row
///
/// State transitions (post, reverse, draft edit) take this lock first so
/// concurrent callers queue and observe committed state, never a stale
/// pool read.
pub async fn fetch_entry_for_update(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: Uuid,
) -> Result<Option<JournalEntry>, sqlx::Error> {
    sqlx::query_as::<_, JournalEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM journal_entries WHERE id = $1 FOR UPDATE"
    ))
    .bind(entry_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Fetch an entry's lines inside a transaction, ordered by line_no
pub async fn fetch_lines_tx(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: Uuid,
) -> Result<Vec<JournalLine>, sqlx::Error> {
    sqlx::query_as::<_, JournalLine>(
        r#"
        SELECT id, journal_entry_id, line_no, account_id, debit_minor, credit_minor, description
        FROM journal_entry_lines
        WHERE journal_entry_id = $1
        ORDER BY line_no
        "#,
    )
    .bind(entry_id)
    .fetch_all(&mut **tx)
    .await
}

/// Fetch a journal entry by ID with its lines, ordered by line_no
pub async fn fetch_entry_with_lines(
    pool: &PgPool,
    entry_id: Uuid,
) -> Result<Option<(JournalEntry, Vec<JournalLine>)>, sqlx::Error> {
    let Some(entry) = fetch_entry(pool, entry_id).await? else {
        return Ok(None);
    };

    let lines = sqlx::query_as::<_, JournalLine>(
        r#"
        SELECT id, journal_entry_id, line_no, account_id, debit_minor, credit_minor, description
        FROM journal_entry_lines
        WHERE journal_entry_id = $1
        ORDER BY line_no
        "#,
    )
    .bind(entry_id)
    .fetch_all(pool)
    .await?;

    Ok(Some((entry, lines)))
}

/// Mark an entry posted, guarded against double-posting
///
/// Returns true if the row transitioned; false means it was already posted
/// (or missing), so a concurrent caller won the race.
pub async fn mark_posted(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: Uuid,
    posted_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE journal_entries SET is_posted = TRUE, posted_at = $2 WHERE id = $1 AND NOT is_posted",
    )
    .bind(entry_id)
    .bind(posted_at)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Flag an entry as reversed, guarded against double-reversal
pub async fn mark_reversed(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE journal_entries SET is_reversed = TRUE WHERE id = $1 AND is_posted AND NOT is_reversed",
    )
    .bind(entry_id)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Replace the header fields of a draft entry
pub async fn update_draft_header(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: Uuid,
    entry_date: NaiveDate,
    description: &str,
    source_module: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE journal_entries
        SET entry_date = $2, description = $3, source_module = $4
        WHERE id = $1
        "#,
    )
    .bind(entry_id)
    .bind(entry_date)
    .bind(description)
    .bind(source_module)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Delete all lines of a draft entry (prior to re-insert on draft edit)
pub async fn delete_lines(
    tx: &mut Transaction<'_, Postgres>,
    entry_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM journal_entry_lines WHERE journal_entry_id = $1")
        .bind(entry_id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}
