/// Main application entry point
mod cache;
mod clients;
mod config;
mod domain;
mod errors;
mod handlers;
mod repo;
mod routes;
mod services;
mod utils;

use crate::cache::MemoryCache;
use crate::clients::NasaClient;
use crate::config::AppConfig;
use crate::handlers::AppState;
use crate::repo::{init_db, PgFavoriteStore};
use crate::routes::build_router;
use crate::services::AstronomyService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Load configuration
    let config = AppConfig::from_env()?;
    info!("Configuration loaded successfully");

    // Initialize database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    info!("Database connection pool established");

    // Initialize database schema
    init_db(&pool).await?;
    info!("Database schema initialized");

    // Initialize clients and stores
    let nasa_client = NasaClient::new(
        config.nasa_api_key.clone(),
        config.apod_url.clone(),
        config.rover_url.clone(),
    )
    .map_err(|e| anyhow::anyhow!("failed to build NASA client: {}", e))?;
    let cache = Arc::new(MemoryCache::new());
    let favorites = Arc::new(PgFavoriteStore::new(pool.clone()));

    // Initialize services
    let astronomy = Arc::new(AstronomyService::new(nasa_client, cache));

    // Initialize application state
    let state = AppState {
        astronomy,
        favorites,
    };

    // Build router
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("spaceeye service listening on {}", config.bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
