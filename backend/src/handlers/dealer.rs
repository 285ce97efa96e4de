//! HTTP handlers for dealer endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::AppResult;
use crate::services::dealer::{
    CreateDealerInput, DealerResponse, DealerService, ListDealersQuery, UpdateDealerInput,
};
use crate::AppState;

/// Create a new dealer
pub async fn create_dealer(
    State(state): State<AppState>,
    Json(input): Json<CreateDealerInput>,
) -> AppResult<Json<DealerResponse>> {
    let service = DealerService::new(state.db, state.cache);
    let dealer = service.create_dealer(input).await?;
    Ok(Json(dealer))
}

/// List dealers
pub async fn list_dealers(
    State(state): State<AppState>,
    Query(query): Query<ListDealersQuery>,
) -> AppResult<Json<Vec<DealerResponse>>> {
    let service = DealerService::new(state.db, state.cache);
    let dealers = service.list_dealers(query).await?;
    Ok(Json(dealers))
}

/// Get a dealer by slug
pub async fn get_dealer(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DealerResponse>> {
    let service = DealerService::new(state.db, state.cache);
    let dealer = service.get_dealer(&slug).await?;
    Ok(Json(dealer))
}

/// Update a dealer by slug
pub async fn update_dealer(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(input): Json<UpdateDealerInput>,
) -> AppResult<Json<DealerResponse>> {
    let service = DealerService::new(state.db, state.cache);
    let dealer = service.update_dealer(&slug, input).await?;
    Ok(Json(dealer))
}

/// Delete a dealer by slug
pub async fn delete_dealer(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<()>> {
    let service = DealerService::new(state.db, state.cache);
    service.delete_dealer(&slug).await?;
    Ok(Json(()))
}
