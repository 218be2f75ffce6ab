//! Transaction routes. Every route requires a session; transactions are
//! append-only.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use kubra_market_core::{OrderId, TransactionId};

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{NewTransaction, Transaction};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/transactions", get(list).post(create))
        .route("/api/transactions/{id}", get(show))
}

/// `GET /api/transactions?orderId=..`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    pub order_id: Option<OrderId>,
}

/// # Errors
///
/// 401 when anonymous, 400 for a malformed filter.
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    filter: Result<Query<TransactionFilter>, QueryRejection>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let Query(filter) = filter?;
    let transactions = match filter.order_id {
        Some(order_id) => state.storage().list_transactions_by_order(order_id).await?,
        None => state.storage().list_transactions().await?,
    };
    Ok(Json(transactions))
}

/// # Errors
///
/// 401 when anonymous, 400 for a malformed id, 404 if missing.
pub async fn show(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    id: Result<Path<TransactionId>, PathRejection>,
) -> Result<Json<Transaction>, AppError> {
    let Path(id) = id?;
    state
        .storage()
        .get_transaction(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))
}

/// # Errors
///
/// 401 when anonymous, 400 for invalid fields, amounts or payment methods.
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    body: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let Json(transaction) = body?;
    transaction
        .validate()
        .map_err(|errors| AppError::validation("Invalid transaction data", errors))?;

    let transaction = state.storage().create_transaction(transaction).await?;
    tracing::info!(
        transaction_id = %transaction.transaction_id,
        payment_method = %transaction.payment_method,
        user = %user.username,
        "Transaction recorded"
    );

    Ok((StatusCode::CREATED, Json(transaction)))
}
