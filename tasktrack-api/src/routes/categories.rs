/// Category endpoints
///
/// # Endpoints
///
/// - `GET    /api/categories` - list, provisioning the defaults on first use
/// - `POST   /api/categories` - create
/// - `DELETE /api/categories/:id` - delete; its tasks keep existing uncategorized

use crate::{
    app::{AppState, AuthUser},
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tasktrack_shared::models::category::{Category, NewCategory};
use validator::Validate;

/// Create category request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    /// Color tag, e.g. "blue" or "#3b82f6"
    #[serde(default)]
    #[validate(length(max = 32, message = "Color must be at most 32 characters"))]
    pub color: String,
}

pub async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = state.categories.ensure_categories(user.user_id).await?;
    Ok(Json(categories))
}

/// Creates a category owned by the caller; responds `201 Created`
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    req.validate()?;

    let category = state
        .categories
        .create_category(user.user_id, NewCategory::new(req.name, req.color))
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Responds `204 No Content`, or `404` if the caller does not own the category
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.categories.delete_category(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
