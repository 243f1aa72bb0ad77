//! Trial Balance API Routes
//!
//! Endpoint for the trial balance report as of a cutoff date. A
//! reconciliation failure is a 500: it signals data corruption, not a
//! caller mistake, and must never be papered over.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;

use crate::services::trial_balance_service::{self, TrialBalanceError, TrialBalanceResponse};

/// Query parameters for the trial balance endpoint
#[derive(Debug, Deserialize)]
pub struct TrialBalanceQuery {
    /// Cutoff date, inclusive (YYYY-MM-DD)
    pub as_of: NaiveDate,
}

/// Handler for GET /api/ledger/trial-balance
pub async fn get_trial_balance(
    State(pool): State<Arc<PgPool>>,
    Query(params): Query<TrialBalanceQuery>,
) -> Result<Json<TrialBalanceResponse>, TrialBalanceErrorResponse> {
    let tb = trial_balance_service::get_trial_balance(&pool, params.as_of).await?;
    Ok(Json(tb))
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Error response wrapper for proper HTTP error handling
#[derive(Debug)]
pub struct TrialBalanceErrorResponse {
    pub status: StatusCode,
    pub message: String,
}

impl From<TrialBalanceError> for TrialBalanceErrorResponse {
    fn from(err: TrialBalanceError) -> Self {
        let status = match &err {
            TrialBalanceError::OutOfBalance { .. } => {
                tracing::error!(error = %err, "Trial balance failed to reconcile");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            TrialBalanceError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        TrialBalanceErrorResponse {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for TrialBalanceErrorResponse {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
