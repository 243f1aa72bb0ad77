//! Account Ledger API Routes
//!
//! Endpoint for the per-account ledger view: opening balance, running
//! balances through the requested range, closing balance.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::repos::ledger_query_repo::LedgerQueryError;
use crate::services::ledger_service::{self, LedgerError, LedgerResponse};

/// Query parameters for the ledger endpoint
#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    /// Start of the range, inclusive (YYYY-MM-DD)
    pub start_date: NaiveDate,
    /// End of the range, inclusive (YYYY-MM-DD)
    pub end_date: NaiveDate,
}

/// Handler for GET /api/ledger/accounts/{id}/ledger
pub async fn get_account_ledger(
    State(pool): State<Arc<PgPool>>,
    Path(id): Path<Uuid>,
    Query(params): Query<LedgerQuery>,
) -> Result<Json<LedgerResponse>, LedgerErrorResponse> {
    let ledger =
        ledger_service::get_account_ledger(&pool, id, params.start_date, params.end_date).await?;

    Ok(Json(ledger))
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error response wrapper for proper HTTP error handling
#[derive(Debug)]
pub struct LedgerErrorResponse {
    pub status: StatusCode,
    pub message: String,
}

impl From<LedgerError> for LedgerErrorResponse {
    fn from(err: LedgerError) -> Self {
        let status = match &err {
            LedgerError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::Query(LedgerQueryError::InvalidDateRange { .. }) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        LedgerErrorResponse {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for LedgerErrorResponse {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
