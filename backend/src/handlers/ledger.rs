//! HTTP handlers for party ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::ledger::{
    CreateLedgerInput, LedgerEntry, LedgerService, ListLedgersQuery, UpdateLedgerInput,
};
use crate::AppState;

/// Create a new ledger entry
pub async fn create_ledger(
    State(state): State<AppState>,
    Json(input): Json<CreateLedgerInput>,
) -> AppResult<Json<LedgerEntry>> {
    let service = LedgerService::new(state.db, state.cache);
    let entry = service.create_entry(input).await?;
    Ok(Json(entry))
}

/// List ledger entries with optional filters
pub async fn list_ledgers(
    State(state): State<AppState>,
    Query(query): Query<ListLedgersQuery>,
) -> AppResult<Json<Vec<LedgerEntry>>> {
    let service = LedgerService::new(state.db, state.cache);
    let entries = service.list_entries(query).await?;
    Ok(Json(entries))
}

/// Get a ledger entry by id
pub async fn get_ledger(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<LedgerEntry>> {
    let service = LedgerService::new(state.db, state.cache);
    let entry = service.get_entry(entry_id).await?;
    Ok(Json(entry))
}

/// Update a ledger entry by id
pub async fn update_ledger(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    Json(input): Json<UpdateLedgerInput>,
) -> AppResult<Json<LedgerEntry>> {
    let service = LedgerService::new(state.db, state.cache);
    let entry = service.update_entry(entry_id, input).await?;
    Ok(Json(entry))
}

/// Delete a ledger entry by id
pub async fn delete_ledger(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = LedgerService::new(state.db, state.cache);
    service.delete_entry(entry_id).await?;
    Ok(Json(()))
}
