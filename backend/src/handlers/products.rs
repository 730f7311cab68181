//! HTTP handlers for product management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Product, ProductVariant};
use crate::services::product::{
    CreateProductInput, CreateVariantInput, ProductService, ProductStockSummary,
};
use crate::AppState;

/// Create a product
pub async fn create_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// List products
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    let service = ProductService::new(state.db);
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Get a product
pub async fn get_product(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = ProductService::new(state.db);
    let product = service.get_product(product_id).await?;
    Ok(Json(product))
}

/// Add a variant to a product
pub async fn create_variant(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<CreateVariantInput>,
) -> AppResult<Json<ProductVariant>> {
    let service = ProductService::new(state.db);
    let variant = service.create_variant(product_id, input).await?;
    Ok(Json(variant))
}

/// List variants of a product
pub async fn list_variants(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Vec<ProductVariant>>> {
    let service = ProductService::new(state.db);
    let variants = service.list_variants(product_id).await?;
    Ok(Json(variants))
}

/// Total stock for a product across all locations
pub async fn get_product_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ProductStockSummary>> {
    let service = ProductService::new(state.db);
    let summary = service.stock_summary(product_id).await?;
    Ok(Json(summary))
}
