//! Route definitions for the Inventory Management System

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use shared::validation::MAX_IMAGE_BYTES;

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Category management
        .nest("/categories", category_routes())
        // Dealer management
        .nest("/dealers", dealer_routes())
        // Product catalog and stock
        .nest("/products", product_routes())
        // Media center
        .nest("/media-center", media_routes())
        // Party ledger
        .nest("/party-ledger", ledger_routes())
        // Dashboard
        .nest("/dashboard", dashboard_routes())
        // Reports
        .nest("/reports", report_routes())
}

/// Category CRUD routes
fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/:slug",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
}

/// Dealer CRUD routes
fn dealer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_dealers).post(handlers::create_dealer),
        )
        .route(
            "/:slug",
            get(handlers::get_dealer)
                .put(handlers::update_dealer)
                .delete(handlers::delete_dealer),
        )
}

/// Product CRUD and stock-addition routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:slug",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:slug/stock", post(handlers::add_stock))
}

/// Media center routes; uploads need a larger body limit than the default
fn media_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_media).post(handlers::create_media))
        .route(
            "/:media_id",
            get(handlers::get_media)
                .put(handlers::update_media)
                .delete(handlers::delete_media),
        )
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024))
}

/// Party ledger routes
fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_ledgers).post(handlers::create_ledger),
        )
        .route(
            "/:entry_id",
            get(handlers::get_ledger)
                .put(handlers::update_ledger)
                .delete(handlers::delete_ledger),
        )
}

/// Dashboard routes
fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/summary", get(handlers::dashboard_summary))
}

/// Read-only report routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/category-wise", get(handlers::category_wise_report))
        .route("/monthly-stock", get(handlers::monthly_stock_report))
        .route("/dues-summary", get(handlers::dues_summary_report))
        .route("/stock-value", get(handlers::stock_value_report))
}
