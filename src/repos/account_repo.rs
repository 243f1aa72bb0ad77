use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

/// Account type enum matching database account_type
#[derive(Debug, Clone, Copy, sqlx::Type, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "account_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
    Cogs,
}

/// Account model representing a Chart of Accounts entry
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub name_secondary: Option<String>,
    pub account_type: AccountType,
    pub parent_account_id: Option<Uuid>,
    pub is_header: bool,
    pub is_active: bool,
    pub currency: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a new account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub code: String,
    pub name: String,
    pub name_secondary: Option<String>,
    pub account_type: AccountType,
    pub parent_account_id: Option<Uuid>,
    pub is_header: bool,
    pub currency: String,
    pub description: Option<String>,
}

/// Partial update for an account
///
/// Outer `None` leaves the column unchanged. For the nullable columns
/// the inner option distinguishes setting a value from clearing it back
/// to NULL (e.g. detaching a child account to root).
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub name_secondary: Option<Option<String>>,
    pub parent_account_id: Option<Option<Uuid>>,
    pub is_header: Option<bool>,
    pub is_active: Option<bool>,
    pub description: Option<Option<String>>,
}

/// Errors that can occur during account repository operations
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Account not found: {code}")]
    NotFound { code: String },

    #[error("Account is inactive: {code}")]
    Inactive { code: String },

    #[error("Account is a header account and cannot be posted to: {code}")]
    Header { code: String },

    #[error("Account has journal lines and cannot become a header: {code}")]
    HasLines { code: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

const ACCOUNT_COLUMNS: &str = "id, code, name, name_secondary, account_type, parent_account_id, \
                               is_header, is_active, currency, description, created_at";

/// Insert a new account and return it
pub async fn insert(pool: &PgPool, new: &NewAccount) -> Result<Account, AccountError> {
    let account = sqlx::query_as::<_, Account>(&format!(
        r#"
        INSERT INTO accounts
            (id, code, name, name_secondary, account_type, parent_account_id,
             is_header, is_active, currency, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $9)
        RETURNING {ACCOUNT_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(&new.code)
    .bind(&new.name)
    .bind(&new.name_secondary)
    .bind(new.account_type)
    .bind(new.parent_account_id)
    .bind(new.is_header)
    .bind(&new.currency)
    .bind(&new.description)
    .fetch_one(pool)
    .await?;

    Ok(account)
}

/// Apply a partial update to an account
///
/// Returns the updated account, or `NotFound` if the id does not exist.
/// Flipping `is_header` to true is rejected with `HasLines` once journal
/// lines reference the account: header accounts aggregate, they never
/// carry postings.
pub async fn update(pool: &PgPool, id: Uuid, patch: &AccountPatch) -> Result<Account, AccountError> {
    if patch.is_header == Some(true) {
        let has_lines = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM journal_entry_lines WHERE account_id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        if has_lines {
            return Err(AccountError::HasLines {
                code: id.to_string(),
            });
        }
    }

    let account = sqlx::query_as::<_, Account>(&format!(
        r#"
        UPDATE accounts
        SET name = COALESCE($2, name),
            name_secondary = CASE WHEN $3 THEN $4 ELSE name_secondary END,
            parent_account_id = CASE WHEN $5 THEN $6 ELSE parent_account_id END,
            is_header = COALESCE($7, is_header),
            is_active = COALESCE($8, is_active),
            description = CASE WHEN $9 THEN $10 ELSE description END
        WHERE id = $1
        RETURNING {ACCOUNT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&patch.name)
    .bind(patch.name_secondary.is_some())
    .bind(patch.name_secondary.clone().flatten())
    .bind(patch.parent_account_id.is_some())
    .bind(patch.parent_account_id.flatten())
    .bind(patch.is_header)
    .bind(patch.is_active)
    .bind(patch.description.is_some())
    .bind(patch.description.clone().flatten())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AccountError::NotFound {
        code: id.to_string(),
    })?;

    Ok(account)
}

/// Soft-deactivate an account
///
/// Accounts are never hard-deleted: journal lines hold permanent references,
/// so removal is always `is_active = false`.
pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<(), AccountError> {
    let result = sqlx::query("UPDATE accounts SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AccountError::NotFound {
            code: id.to_string(),
        });
    }

    Ok(())
}

/// Find an account by id
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Account>, AccountError> {
    let account = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

/// Find an account by code
pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Account>, AccountError> {
    let account = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE code = $1"
    ))
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

/// List all active accounts ordered by code
pub async fn list_active(pool: &PgPool) -> Result<Vec<Account>, AccountError> {
    let accounts = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE is_active ORDER BY code"
    ))
    .fetch_all(pool)
    .await?;

    Ok(accounts)
}

/// Find an account that journal lines may post to, within a transaction
///
/// Returns an error if the account doesn't exist, is inactive, or is a
/// header (aggregation-only) account.
pub async fn find_postable_by_code_tx(
    tx: &mut Transaction<'_, Postgres>,
    code: &str,
) -> Result<Account, AccountError> {
    let account = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE code = $1"
    ))
    .bind(code)
    .fetch_optional(&mut **tx)
    .await?;

    match account {
        Some(acc) if !acc.is_active => Err(AccountError::Inactive {
            code: code.to_string(),
        }),
        Some(acc) if acc.is_header => Err(AccountError::Header {
            code: code.to_string(),
        }),
        Some(acc) => Ok(acc),
        None => Err(AccountError::NotFound {
            code: code.to_string(),
        }),
    }
}
