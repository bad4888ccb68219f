//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::extract::{AppJson, AppPath, AppQuery};
use crate::domain::{RequestContext, Transaction};
use crate::error::AppError;
use crate::handlers::{
    BalanceRetrievalHandler, BalanceStatus, SubmitTransactionCommand, TransactionAdmissionHandler,
};
use crate::state::AppState;

/// Upper bound for a history page
const MAX_HISTORY_LIMIT: i64 = 500;

const PROCESSING_MESSAGE: &str =
    "The account balance is being calculated. Please try again in a few moments.";

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub account_id: Uuid,
    #[serde(default)]
    pub card_token: Option<String>,
    #[serde(default)]
    pub refund_transaction_id: Option<Uuid>,
    pub amount_cents: i64,
    #[serde(rename = "type")]
    pub transaction_type: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BalanceResponse {
    Ready { account_id: Uuid, balance_cents: i64 },
    Processing { message: String },
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub account_id: Uuid,
    pub transactions: Vec<Transaction>,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route("/transactions/:account_id", get(get_account_transactions))
        .route("/accounts/:account_id/balance", get(get_account_balance))
}

// =========================================================================
// POST /transactions
// =========================================================================

/// Submit a transaction. A suppressed duplicate answers exactly like a
/// fresh admission.
async fn create_transaction(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    AppJson(request): AppJson<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let handler = TransactionAdmissionHandler::new(state.store, state.publisher);

    let command = SubmitTransactionCommand::new(
        request.account_id,
        request.amount_cents,
        request.transaction_type,
    );
    let command = match request.card_token {
        Some(token) => command.with_card_token(token),
        None => command,
    };
    let command = match request.refund_transaction_id {
        Some(original_id) => command.with_refund_of(original_id),
        None => command,
    };

    let result = handler.execute(command, &context).await?;

    Ok((StatusCode::CREATED, Json(result.transaction)))
}

// =========================================================================
// GET /transactions/:account_id
// =========================================================================

/// Transaction history of an account, newest first
async fn get_account_transactions(
    State(state): State<AppState>,
    AppPath(account_id): AppPath<Uuid>,
    AppQuery(query): AppQuery<HistoryQuery>,
) -> Result<Json<HistoryResponse>, AppError> {
    if query.limit <= 0 || query.offset < 0 {
        return Err(AppError::InvalidRequest(
            "limit must be positive and offset non-negative".to_string(),
        ));
    }
    let limit = query.limit.min(MAX_HISTORY_LIMIT);

    let transactions = state
        .store
        .find_by_account(account_id, limit, query.offset)
        .await?;

    Ok(Json(HistoryResponse {
        account_id,
        transactions,
    }))
}

// =========================================================================
// GET /accounts/:account_id/balance
// =========================================================================

/// Cached balance (200) or recomputation in progress (202)
async fn get_account_balance(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    AppPath(account_id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let handler = BalanceRetrievalHandler::new(state.cache, state.publisher);

    let response = match handler.execute(account_id, &context).await? {
        BalanceStatus::Ready { balance_cents } => (
            StatusCode::OK,
            Json(BalanceResponse::Ready {
                account_id,
                balance_cents,
            }),
        )
            .into_response(),
        BalanceStatus::Processing => (
            StatusCode::ACCEPTED,
            Json(BalanceResponse::Processing {
                message: PROCESSING_MESSAGE.to_string(),
            }),
        )
            .into_response(),
    };

    Ok(response)
}
