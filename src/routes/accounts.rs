//! Chart-of-Accounts API Routes
//!
//! Endpoints for account CRUD (create, partial update, soft deactivate)
//! and the account hierarchy view.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::repos::account_repo::{self, Account, AccountError, AccountPatch, AccountType, NewAccount};
use crate::services::coa_tree::{self, AccountNode, CoaTreeError, TreeWarning};

/// Request body for creating an account
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub code: String,
    pub name: String,
    pub name_secondary: Option<String>,
    pub account_type: AccountType,
    pub parent_account_id: Option<Uuid>,
    #[serde(default)]
    pub is_header: bool,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub description: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Request body for partially updating an account
///
/// Omitting a field leaves it unchanged; for the nullable fields an
/// explicit JSON `null` clears the column (e.g. detaching an account
/// from its parent). `is_active: true` reactivates a deactivated
/// account.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateAccountRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub name_secondary: Option<Option<String>>,
    #[serde(default)]
    pub parent_account_id: Option<Option<Uuid>>,
    pub is_header: Option<bool>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub description: Option<Option<String>>,
}

/// Account response DTO
#[derive(Debug, Serialize)]
pub struct AccountResponse {
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
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        AccountResponse {
            id: account.id,
            code: account.code,
            name: account.name,
            name_secondary: account.name_secondary,
            account_type: account.account_type,
            parent_account_id: account.parent_account_id,
            is_header: account.is_header,
            is_active: account.is_active,
            currency: account.currency,
            description: account.description,
        }
    }
}

/// Account tree response
#[derive(Debug, Serialize)]
pub struct AccountTreeResponse {
    pub roots: Vec<AccountNode>,
    pub warnings: Vec<TreeWarning>,
}

/// Handler for POST /api/ledger/accounts
pub async fn create_account(
    State(pool): State<Arc<PgPool>>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AccountErrorResponse> {
    let new = NewAccount {
        code: req.code,
        name: req.name,
        name_secondary: req.name_secondary,
        account_type: req.account_type,
        parent_account_id: req.parent_account_id,
        is_header: req.is_header,
        currency: req.currency,
        description: req.description,
    };

    let account = account_repo::insert(&pool, &new).await?;
    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Handler for PATCH /api/ledger/accounts/{id}
pub async fn update_account(
    State(pool): State<Arc<PgPool>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAccountRequest>,
) -> Result<Json<AccountResponse>, AccountErrorResponse> {
    let patch = AccountPatch {
        name: req.name,
        name_secondary: req.name_secondary,
        parent_account_id: req.parent_account_id,
        is_header: req.is_header,
        is_active: req.is_active,
        description: req.description,
    };

    let account = account_repo::update(&pool, id, &patch).await?;
    Ok(Json(account.into()))
}

/// Handler for POST /api/ledger/accounts/{id}/deactivate
///
/// Accounts are never hard-deleted; journal lines reference them forever.
pub async fn deactivate_account(
    State(pool): State<Arc<PgPool>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AccountErrorResponse> {
    account_repo::deactivate(&pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/ledger/accounts/tree
pub async fn get_account_tree(
    State(pool): State<Arc<PgPool>>,
) -> Result<Json<AccountTreeResponse>, AccountErrorResponse> {
    let tree = coa_tree::get_account_tree(&pool).await?;

    Ok(Json(AccountTreeResponse {
        roots: tree.roots,
        warnings: tree.warnings,
    }))
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error response wrapper for proper HTTP error handling
#[derive(Debug)]
pub struct AccountErrorResponse {
    pub status: StatusCode,
    pub message: String,
}

impl From<AccountError> for AccountErrorResponse {
    fn from(err: AccountError) -> Self {
        let status = match &err {
            AccountError::NotFound { .. } => StatusCode::NOT_FOUND,
            AccountError::Inactive { .. }
            | AccountError::Header { .. }
            | AccountError::HasLines { .. } => StatusCode::CONFLICT,
            AccountError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        AccountErrorResponse {
            status,
            message: err.to_string(),
        }
    }
}

impl From<CoaTreeError> for AccountErrorResponse {
    fn from(err: CoaTreeError) -> Self {
        match err {
            CoaTreeError::Account(inner) => inner.into(),
        }
    }
}

impl IntoResponse for AccountErrorResponse {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
