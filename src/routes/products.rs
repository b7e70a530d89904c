//! Product catalog routes: list/search, lookup, and admin CRUD.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireAdmin;
use crate::models::product::{CreateProduct, Product, ProductFilters, UpdateProduct};
use crate::services::product as product_service;
use crate::AppState;

/// GET /api/v1/products - list products, optionally filtered by `search`.
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filters): Query<ProductFilters>,
) -> Result<Json<ApiResponse<Vec<Product>>>, AppError> {
    let products = product_service::list(state.repo.as_ref(), &filters).await?;
    Ok(ApiResponse::success(products))
}

/// POST /api/v1/products - create a product (admin).
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(body): Json<CreateProduct>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let product = product_service::create(state.repo.as_ref(), &body).await?;
    Ok(ApiResponse::success(product))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let product = product_service::find_by_id(state.repo.as_ref(), id).await?;
    Ok(ApiResponse::success(product))
}

/// GET /api/v1/products/barcode/{barcode}
pub async fn get_by_barcode(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(barcode): Path<String>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let product = product_service::find_by_barcode(state.repo.as_ref(), &barcode).await?;
    Ok(ApiResponse::success(product))
}

/// PUT /api/v1/products/{id} - update a product (admin).
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProduct>,
) -> Result<Json<ApiResponse<Product>>, AppError> {
    let product = product_service::update(state.repo.as_ref(), id, &body).await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /api/v1/products/{id} - delete a product (admin).
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<&'static str>>, AppError> {
    product_service::delete(state.repo.as_ref(), id).await?;
    Ok(ApiResponse::success("Product deleted"))
}
