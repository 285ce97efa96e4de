//! HTTP handlers for category endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::AppResult;
use crate::services::category::{
    Category, CategoryService, CreateCategoryInput, ListCategoriesQuery, UpdateCategoryInput,
};
use crate::AppState;

/// Create a new category
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.db, state.cache);
    let category = service.create_category(input).await?;
    Ok(Json(category))
}

/// List categories
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> AppResult<Json<Vec<Category>>> {
    let service = CategoryService::new(state.db, state.cache);
    let categories = service.list_categories(query).await?;
    Ok(Json(categories))
}

/// Get a category by slug
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.db, state.cache);
    let category = service.get_category(&slug).await?;
    Ok(Json(category))
}

/// Update a category by slug
pub async fn update_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<Json<Category>> {
    let service = CategoryService::new(state.db, state.cache);
    let category = service.update_category(&slug, input).await?;
    Ok(Json(category))
}

/// Delete a category by slug
pub async fn delete_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<()>> {
    let service = CategoryService::new(state.db, state.cache);
    service.delete_category(&slug).await?;
    Ok(Json(()))
}
