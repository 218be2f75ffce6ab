//! Order routes. Every route requires a session.

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

use kubra_market_core::{OrderId, ShopId};

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{NewOrder, Order, OrderUpdate};
use crate::state::AppState;

const NOT_FOUND: &str = "Order not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(list).post(create))
        .route("/api/orders/{id}", get(show).put(update))
}

/// `GET /api/orders?shopId=..`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub shop_id: Option<ShopId>,
}

/// # Errors
///
/// 401 when anonymous, 400 for a malformed filter.
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    filter: Result<Query<OrderFilter>, QueryRejection>,
) -> Result<Json<Vec<Order>>, AppError> {
    let Query(filter) = filter?;
    let orders = match filter.shop_id {
        Some(shop_id) => state.storage().list_orders_by_shop(shop_id).await?,
        None => state.storage().list_orders().await?,
    };
    Ok(Json(orders))
}

/// # Errors
///
/// 401 when anonymous, 400 for a malformed id, 404 if missing.
pub async fn show(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    id: Result<Path<OrderId>, PathRejection>,
) -> Result<Json<Order>, AppError> {
    let Path(id) = id?;
    state
        .storage()
        .get_order(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

/// # Errors
///
/// 401 when anonymous, 400 for invalid fields, amounts or statuses.
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let Json(order) = body?;
    order
        .validate()
        .map_err(|errors| AppError::validation("Invalid order data", errors))?;

    let order = state.storage().create_order(order).await?;
    tracing::info!(
        order_id = %order.id,
        order_number = %order.order_number,
        user = %user.username,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// Partial update, typically a status change.
///
/// # Errors
///
/// 401 when anonymous, 400 for invalid input, 404 if missing.
pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    id: Result<Path<OrderId>, PathRejection>,
    body: Result<Json<OrderUpdate>, JsonRejection>,
) -> Result<Json<Order>, AppError> {
    let Path(id) = id?;
    let Json(changes) = body?;
    changes
        .validate()
        .map_err(|errors| AppError::validation("Invalid order data", errors))?;

    let order = state
        .storage()
        .update_order(id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;
    tracing::info!(order_id = %order.id, status = %order.status, user = %user.username, "Order updated");

    Ok(Json(order))
}
