//! HTTP handlers for dashboard and report endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::services::reporting::{
    CategoryReportEntry, DashboardSummary, DuesSummary, MonthlyStockEntry, ReportingService,
    StockValueQuery, StockValueReport,
};
use crate::AppState;

/// Dashboard summary across products and the party ledger
pub async fn dashboard_summary(
    State(state): State<AppState>,
) -> AppResult<Json<DashboardSummary>> {
    let service = ReportingService::new(state.db);
    let summary = service.dashboard_summary().await?;
    Ok(Json(summary))
}

/// Stock and value per category
pub async fn category_wise_report(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CategoryReportEntry>>> {
    let service = ReportingService::new(state.db);
    let entries = service.category_wise().await?;
    Ok(Json(entries))
}

/// Stock additions per calendar month
pub async fn monthly_stock_report(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MonthlyStockEntry>>> {
    let service = ReportingService::new(state.db);
    let entries = service.monthly_stock().await?;
    Ok(Json(entries))
}

/// Dues bucketed by effective status
pub async fn dues_summary_report(State(state): State<AppState>) -> AppResult<Json<DuesSummary>> {
    let service = ReportingService::new(state.db);
    let summary = service.dues_summary().await?;
    Ok(Json(summary))
}

/// Total stock value, optionally grouped by category
pub async fn stock_value_report(
    State(state): State<AppState>,
    Query(query): Query<StockValueQuery>,
) -> AppResult<Json<StockValueReport>> {
    let service = ReportingService::new(state.db);
    let report = service
        .stock_value(query.group_by_category.unwrap_or(false))
        .await?;
    Ok(Json(report))
}
