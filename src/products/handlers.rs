// HTTP handlers for product endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::error::ApiError;
use crate::products::models::{
    CreateProductRequest, ProductEnvelope, ProductListQuery, ProductPage, UpdateProductRequest,
};
use crate::validation::ValidatedJson;
use crate::AppState;

/// Create a new product
/// POST /api/product
#[utoipa::path(
    post,
    path = "/api/product",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created", body = ProductEnvelope),
        (status = 401, description = "Not an admin", body = String),
        (status = 422, description = "Missing field, duplicate name or unknown category", body = String)
    ),
    tag = "products"
)]
pub async fn create_product_handler(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateProductRequest>,
) -> Result<Json<ProductEnvelope>, ApiError> {
    let product = state.products.create(request).await?;
    Ok(Json(ProductEnvelope { product }))
}

/// List products one page at a time
/// GET /api/product
#[utoipa::path(
    get,
    path = "/api/product",
    params(ProductListQuery),
    responses(
        (status = 200, description = "One page of products", body = ProductPage),
        (status = 401, description = "Not authenticated", body = String),
        (status = 422, description = "Non-numeric categoryId", body = String)
    ),
    tag = "products"
)]
pub async fn list_products_handler(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<ProductListQuery>, ApiError>,
) -> Result<Json<ProductPage>, ApiError> {
    tracing::debug!("Fetching products with query parameters: {:?}", query);

    let page = state.products.list(query).await?;
    Ok(Json(page))
}

/// Update some fields of a product
/// PUT /api/product/{id}
#[utoipa::path(
    put,
    path = "/api/product/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductEnvelope),
        (status = 404, description = "Product not found", body = String, example = json!("ProductNotFoundError: The product was not found.")),
        (status = 422, description = "Invalid field, duplicate name or unknown category", body = String)
    ),
    tag = "products"
)]
pub async fn update_product_handler(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
    ValidatedJson(request): ValidatedJson<UpdateProductRequest>,
) -> Result<Json<ProductEnvelope>, ApiError> {
    let product = state.products.update(id, request).await?;
    Ok(Json(ProductEnvelope { product }))
}

/// Delete a product
/// DELETE /api/product/{id}
#[utoipa::path(
    delete,
    path = "/api/product/{id}",
    params(
        ("id" = i32, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found", body = String, example = json!("ProductNotFoundError: The product was not found."))
    ),
    tag = "products"
)]
pub async fn delete_product_handler(
    State(state): State<AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, ApiError>,
) -> Result<StatusCode, ApiError> {
    state.products.delete(id).await?;
    Ok(StatusCode::OK)
}
