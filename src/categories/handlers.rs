// HTTP handlers for category endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::categories::models::{CategoriesEnvelope, CategoryEnvelope, CategoryRequest};
use crate::error::ApiError;
use crate::validation::ValidatedJson;
use crate::AppState;

/// Create a new category
/// POST /api/category
#[utoipa::path(
    post,
    path = "/api/category",
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category created", body = CategoryEnvelope),
        (status = 401, description = "Not an admin", body = String),
        (status = 422, description = "Missing or duplicate name", body = String)
    ),
    tag = "categories"
)]
pub async fn create_category_handler(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CategoryRequest>,
) -> Result<Json<CategoryEnvelope>, ApiError> {
    let name = request.name.unwrap_or_default();
    let category = state.categories.create(&name).await?;

    tracing::info!("Created category {} ({})", category.id, category.name);
    Ok(Json(CategoryEnvelope { category }))
}

/// List all categories
/// GET /api/category
#[utoipa::path(
    get,
    path = "/api/category",
    responses(
        (status = 200, description = "All categories", body = CategoriesEnvelope),
        (status = 401, description = "Not an admin", body = String)
    ),
    tag = "categories"
)]
pub async fn list_categories_handler(
    State(state): State<AppState>,
) -> Result<Json<CategoriesEnvelope>, ApiError> {
    let categories = state.categories.list().await?;

    tracing::debug!("Retrieved {} categories", categories.len());
    Ok(Json(CategoriesEnvelope { categories }))
}

/// Rename a category
/// PUT /api/category/{id}
#[utoipa::path(
    put,
    path = "/api/category/{id}",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryEnvelope),
        (status = 404, description = "Category not found", body = String, example = json!("CategoryNotFoundError: The category was not found.")),
        (status = 422, description = "Missing or duplicate name", body = String)
    ),
    tag = "categories"
)]
pub async fn update_category_handler(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
    ValidatedJson(request): ValidatedJson<CategoryRequest>,
) -> Result<Json<CategoryEnvelope>, ApiError> {
    let name = request.name.unwrap_or_default();
    let category = state
        .categories
        .update(id, &name)
        .await?
        .ok_or(ApiError::CategoryNotFound)?;

    tracing::info!("Updated category {}", category.id);
    Ok(Json(CategoryEnvelope { category }))
}

/// Delete a category. Products in it are kept and list with `category: null`.
/// DELETE /api/category/{id}
#[utoipa::path(
    delete,
    path = "/api/category/{id}",
    params(
        ("id" = i32, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found", body = String, example = json!("CategoryNotFoundError: The category was not found."))
    ),
    tag = "categories"
)]
pub async fn delete_category_handler(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<StatusCode, ApiError> {
    if !state.categories.delete(id).await? {
        return Err(ApiError::CategoryNotFound);
    }

    tracing::info!("Deleted category {}", id);
    Ok(StatusCode::OK)
}
