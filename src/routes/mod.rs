/// Application routes configuration
use crate::handlers::{
    add_favorite, api_data, get_apod, get_mars_rover, health, list_favorites, remove_favorite,
    AppState,
};
use axum::{
    routing::{get, post},
    Router,
};

/// Build the application router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health))
        // Astronomy data endpoints
        .route("/apod", get(get_apod))
        .route("/mars-rover", get(get_mars_rover))
        .route("/api/data", get(api_data))
        // Favorites endpoints
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/remove", post(remove_favorite))
        .with_state(state)
}
