//! Inventory Management System - Backend Server
//!
//! CRUD backend for categories, dealers, products, media assets and the
//! party ledger, with read-through caching and reporting.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cache;
mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use config::Config;

use cache::{CacheLayer, MemoryCache};
use external::MediaHostClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub cache: CacheLayer,
    pub media_host: Option<MediaHostClient>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ims_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Inventory Management Server");
    tracing::info!("Environment: {}", config.environment);

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.environment == "development" {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    // Keyed reads go through an in-process cache with the configured TTL
    let cache = CacheLayer::new(
        Arc::new(MemoryCache::new()),
        Duration::from_secs(config.cache.ttl_seconds),
    );

    // Media host is optional; without it, uploads are rejected with a
    // configuration error while everything else keeps working
    let media_host = config.media.as_ref().map(|media| {
        MediaHostClient::new(
            media.api_endpoint.clone(),
            media.api_key.clone(),
            media.upload_folder.clone(),
        )
    });
    if media_host.is_none() {
        tracing::warn!("No media host configured; media uploads are disabled");
    }

    // Create application state
    let state = AppState {
        db: db_pool,
        cache,
        media_host,
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Inventory Management System API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
