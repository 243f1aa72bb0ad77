//! Journal Entry API Routes
//!
//! Endpoints for the entry lifecycle: create draft, edit draft, fetch,
//! post, and reverse.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::contracts::journal_draft_v1::JournalDraftV1;
use crate::repos::account_repo::AccountError;
use crate::repos::journal_repo::{self, JournalEntry, JournalLine};
use crate::services::posting_service::{self, PostingError};
use crate::services::reversal_service::{self, ReversalError};

/// Request body for reversing a posted entry
#[derive(Debug, Deserialize)]
pub struct ReverseEntryRequest {
    pub reversal_date: NaiveDate,
    pub description: String,
}

/// Response carrying the identifier of a created entry
#[derive(Debug, Serialize)]
pub struct EntryCreatedResponse {
    pub id: Uuid,
}

/// Journal entry response (header + lines)
#[derive(Debug, Serialize)]
pub struct JournalEntryResponse {
    pub id: Uuid,
    pub entry_number: String,
    pub entry_date: NaiveDate,
    pub description: String,
    pub source_module: String,
    pub is_posted: bool,
    pub is_reversed: bool,
    pub posted_at: Option<DateTime<Utc>>,
    pub reverses_entry_id: Option<Uuid>,
    pub lines: Vec<JournalLineResponse>,
}

/// Journal line response
#[derive(Debug, Serialize)]
pub struct JournalLineResponse {
    pub line_no: i32,
    pub account_id: Uuid,
    pub debit_minor: i64,
    pub credit_minor: i64,
    pub description: Option<String>,
}

fn entry_response(entry: JournalEntry, lines: Vec<JournalLine>) -> JournalEntryResponse {
    JournalEntryResponse {
        id: entry.id,
        entry_number: entry.entry_number,
        entry_date: entry.entry_date,
        description: entry.description,
        source_module: entry.source_module,
        is_posted: entry.is_posted,
        is_reversed: entry.is_reversed,
        posted_at: entry.posted_at,
        reverses_entry_id: entry.reverses_entry_id,
        lines: lines
            .into_iter()
            .map(|line| JournalLineResponse {
                line_no: line.line_no,
                account_id: line.account_id,
                debit_minor: line.debit_minor,
                credit_minor: line.credit_minor,
                description: line.description,
            })
            .collect(),
    }
}

/// Handler for POST /api/ledger/journal-entries
pub async fn create_draft(
    State(pool): State<Arc<PgPool>>,
    Json(draft): Json<JournalDraftV1>,
) -> Result<(StatusCode, Json<EntryCreatedResponse>), JournalErrorResponse> {
    let id = posting_service::create_draft(&pool, &draft).await?;
    Ok((StatusCode::CREATED, Json(EntryCreatedResponse { id })))
}

/// Handler for PUT /api/ledger/journal-entries/{id}
pub async fn update_draft(
    State(pool): State<Arc<PgPool>>,
    Path(id): Path<Uuid>,
    Json(draft): Json<JournalDraftV1>,
) -> Result<StatusCode, JournalErrorResponse> {
    posting_service::update_draft(&pool, id, &draft).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/ledger/journal-entries/{id}
pub async fn get_entry(
    State(pool): State<Arc<PgPool>>,
    Path(id): Path<Uuid>,
) -> Result<Json<JournalEntryResponse>, JournalErrorResponse> {
    let (entry, lines) = journal_repo::fetch_entry_with_lines(&pool, id)
        .await
        .map_err(PostingError::Database)?
        .ok_or(PostingError::EntryNotFound(id))?;

    Ok(Json(entry_response(entry, lines)))
}

/// Handler for POST /api/ledger/journal-entries/{id}/post
pub async fn post_entry(
    State(pool): State<Arc<PgPool>>,
    Path(id): Path<Uuid>,
) -> Result<Json<JournalEntryResponse>, JournalErrorResponse> {
    let entry = posting_service::post_entry(&pool, id).await?;
    let (entry, lines) = journal_repo::fetch_entry_with_lines(&pool, entry.id)
        .await
        .map_err(PostingError::Database)?
        .ok_or(PostingError::EntryNotFound(id))?;

    Ok(Json(entry_response(entry, lines)))
}

/// Handler for POST /api/ledger/journal-entries/{id}/reverse
pub async fn reverse_entry(
    State(pool): State<Arc<PgPool>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReverseEntryRequest>,
) -> Result<(StatusCode, Json<EntryCreatedResponse>), JournalErrorResponse> {
    let reversal_id =
        reversal_service::create_reversal(&pool, id, req.reversal_date, &req.description).await?;

    Ok((
        StatusCode::CREATED,
        Json(EntryCreatedResponse { id: reversal_id }),
    ))
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error response wrapper for proper HTTP error handling
#[derive(Debug)]
pub struct JournalErrorResponse {
    pub status: StatusCode,
    pub message: String,
}

impl From<PostingError> for JournalErrorResponse {
    fn from(err: PostingError) -> Self {
        let status = match &err {
            PostingError::Validation(_) | PostingError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            PostingError::EntryNotFound(_) => StatusCode::NOT_FOUND,
            PostingError::AlreadyPosted(_) => StatusCode::CONFLICT,
            PostingError::Unbalanced { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PostingError::Account(AccountError::NotFound { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PostingError::Account(AccountError::Inactive { .. })
            | PostingError::Account(AccountError::Header { .. })
            | PostingError::Account(AccountError::HasLines { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PostingError::Account(AccountError::Database(_)) | PostingError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        JournalErrorResponse {
            status,
            message: err.to_string(),
        }
    }
}

impl From<ReversalError> for JournalErrorResponse {
    fn from(err: ReversalError) -> Self {
        let status = match &err {
            ReversalError::EntryNotFound(_) => StatusCode::NOT_FOUND,
            ReversalError::NotPosted(_) | ReversalError::AlreadyReversed(_) => StatusCode::CONFLICT,
            ReversalError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        JournalErrorResponse {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for JournalErrorResponse {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
