//! Shop category routes. Reads are public; writes require a session.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};

use kubra_market_core::ShopCategoryId;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{NewShopCategory, ShopCategory, ShopCategoryUpdate};
use crate::state::AppState;

const NOT_FOUND: &str = "Shop category not found";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/shop-categories", get(list).post(create))
        .route(
            "/api/shop-categories/{id}",
            get(show).put(update).delete(delete),
        )
}

/// # Errors
///
/// 500 on storage failure.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ShopCategory>>, AppError> {
    Ok(Json(state.storage().list_shop_categories().await?))
}

/// # Errors
///
/// 400 for a malformed id, 404 if missing.
pub async fn show(
    State(state): State<AppState>,
    id: Result<Path<ShopCategoryId>, PathRejection>,
) -> Result<Json<ShopCategory>, AppError> {
    let Path(id) = id?;
    state
        .storage()
        .get_shop_category(id)
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
    body: Result<Json<NewShopCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<ShopCategory>), AppError> {
    let Json(category) = body?;
    category
        .validate()
        .map_err(|errors| AppError::validation("Invalid shop category data", errors))?;

    let category = state.storage().create_shop_category(category).await?;
    tracing::info!(category_id = %category.id, user = %user.username, "Shop category created");

    Ok((StatusCode::CREATED, Json(category)))
}

/// # Errors
///
/// 401 when anonymous, 400 for invalid input, 404 if missing.
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    id: Result<Path<ShopCategoryId>, PathRejection>,
    body: Result<Json<ShopCategoryUpdate>, JsonRejection>,
) -> Result<Json<ShopCategory>, AppError> {
    let Path(id) = id?;
    let Json(changes) = body?;
    changes
        .validate()
        .map_err(|errors| AppError::validation("Invalid shop category data", errors))?;

    state
        .storage()
        .update_shop_category(id, changes)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

/// Delete a category. Shops that reference it keep their dangling id.
///
/// # Errors
///
/// 401 when anonymous, 404 if missing.
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    id: Result<Path<ShopCategoryId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    if !state.storage().delete_shop_category(id).await? {
        return Err(AppError::NotFound(NOT_FOUND.to_string()));
    }
    tracing::info!(category_id = %id, user = %user.username, "Shop category deleted");
    Ok(StatusCode::NO_CONTENT)
}
