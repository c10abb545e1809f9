//! API Routes
//!
//! Configures the Axum router with all catalog service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_cache_handler, create_category_handler, health_handler, list_categories_handler,
    list_materials_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/categories` - Category listing (cached)
/// - `GET /api/materials?categoryId=` - Material listing (cached per category)
/// - `POST /api/admin/categories` - Create a category (admin)
/// - `GET /cache/stats` - Cache statistics
/// - `DELETE /cache` - Drop every cached entry (admin)
/// - `GET /health` - Health check endpoint
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/categories", get(list_categories_handler))
        .route("/api/materials", get(list_materials_handler))
        .route("/api/admin/categories", post(create_category_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache", delete(clear_cache_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
