//! Public sales analytics.

use axum::{Json, Router, extract::State, routing::get};

use crate::error::AppError;
use crate::services::analytics::{self, MonthlySales, ShopSales};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/analytics/sales", get(sales))
        .route("/api/analytics/shops", get(shops))
}

/// Monthly sales totals, oldest month first.
///
/// # Errors
///
/// 500 on storage failure or when a total overflows.
pub async fn sales(State(state): State<AppState>) -> Result<Json<Vec<MonthlySales>>, AppError> {
    let orders = state.storage().list_orders().await?;
    Ok(Json(analytics::monthly_sales(&orders)?))
}

/// Per-shop sales totals, largest first.
///
/// # Errors
///
/// 500 on storage failure or when a total overflows.
pub async fn shops(State(state): State<AppState>) -> Result<Json<Vec<ShopSales>>, AppError> {
    let orders = state.storage().list_orders().await?;
    let shops = state.storage().list_shops().await?;
    Ok(Json(analytics::top_shops(&orders, &shops)?))
}
