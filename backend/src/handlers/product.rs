//! HTTP handlers for product endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::AppResult;
use crate::services::product::{
    AddStockInput, CreateProductInput, ListProductsQuery, ProductResponse, ProductService,
    UpdateProductInput,
};
use crate::AppState;

/// Create a new product with initial stock
pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProductInput>,
) -> AppResult<Json<ProductResponse>> {
    let service = ProductService::new(state.db, state.cache);
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// List products with optional filters
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let service = ProductService::new(state.db, state.cache);
    let products = service.list_products(query).await?;
    Ok(Json(products))
}

/// Get a product by slug
pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ProductResponse>> {
    let service = ProductService::new(state.db, state.cache);
    let product = service.get_product(&slug).await?;
    Ok(Json(product))
}

/// Update a product's details by slug (never its stock)
pub async fn update_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<UpdateProductInput>,
) -> AppResult<Json<ProductResponse>> {
    let service = ProductService::new(state.db, state.cache);
    let product = service.update_product(&slug, input).await?;
    Ok(Json(product))
}

/// Add stock to a product by slug
pub async fn add_stock(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<AddStockInput>,
) -> AppResult<Json<ProductResponse>> {
    let service = ProductService::new(state.db, state.cache);
    let product = service.add_stock(&slug, input).await?;
    Ok(Json(product))
}

/// Delete a product by slug
pub async fn delete_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<()>> {
    let service = ProductService::new(state.db, state.cache);
    service.delete_product(&slug).await?;
    Ok(Json(()))
}
