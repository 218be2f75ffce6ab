//! Shop routes. Reads are public; writes require a session.

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

use kubra_market_core::{ShopCategoryId, ShopId};

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{NewShop, Shop, ShopUpdate};
use crate::state::AppState;

const NOT_FOUND: &str = "Shop not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/shops", get(list).post(create))
        .route("/api/shops/{id}", get(show).put(update).delete(delete))
}

/// `GET /api/shops?categoryId=..`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopFilter {
    pub category_id: Option<ShopCategoryId>,
}

/// # Errors
///
/// 400 for a malformed filter, 500 on storage failure.
pub async fn list(
    State(state): State<AppState>,
    filter: Result<Query<ShopFilter>, QueryRejection>,
) -> Result<Json<Vec<Shop>>, AppError> {
    let Query(filter) = filter?;
    let shops = match filter.category_id {
        Some(category_id) => state.storage().list_shops_by_category(category_id).await?,
        None => state.storage().list_shops().await?,
    };
    Ok(Json(shops))
}

/// # Errors
///
/// 400 for a malformed id, 404 if missing.
pub async fn show(
    State(state): State<AppState>,
    id: Result<Path<ShopId>, PathRejection>,
) -> Result<Json<Shop>, AppError> {
    let Path(id) = id?;
    state
        .storage()
        .get_shop(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

/// # Errors
///
/// 401 when anonymous, 400 for invalid fields.
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    body: Result<Json<NewShop>, JsonRejection>,
) -> Result<(StatusCode, Json<Shop>), AppError> {
    let Json(shop) = body?;
    shop.validate()
        .map_err(|errors| AppError::validation("Invalid shop data", errors))?;

    let shop = state.storage().create_shop(shop).await?;
    tracing::info!(shop_id = %shop.id, user = %user.username, "Shop created");

    Ok((StatusCode::CREATED, Json(shop)))
}

/// # Errors
///
/// 401 when anonymous, 400 for invalid input, 404 if missing.
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    id: Result<Path<ShopId>, PathRejection>,
    body: Result<Json<ShopUpdate>, JsonRejection>,
) -> Result<Json<Shop>, AppError> {
    let Path(id) = id?;
    let Json(changes) = body?;
    changes
        .validate()
        .map_err(|errors| AppError::validation("Invalid shop data", errors))?;

    state
        .storage()
        .update_shop(id, changes)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

/// Delete a shop. Orders that reference it keep their dangling id.
///
/// # Errors
///
/// 401 when anonymous, 404 if missing.
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    id: Result<Path<ShopId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    if !state.storage().delete_shop(id).await? {
        return Err(AppError::NotFound(NOT_FOUND.to_string()));
    }
    tracing::info!(shop_id = %id, user = %user.username, "Shop deleted");
    Ok(StatusCode::NO_CONTENT)
}
