//! API Handlers
//!
//! HTTP request handlers for the catalog endpoints. The two listing handlers
//! read through the shared cache; category creation invalidates it.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::cache::{CacheStore, SharedCache};
use crate::catalog::{CatalogError, CatalogRepository, Category, InMemoryCatalog, Material};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    ClearCacheResponse, CreateCategoryRequest, HealthResponse, MaterialsQuery, StatsResponse,
};

// == Cache Keys ==
/// Cache key for the full category listing
pub const CATEGORIES_KEY: &str = "categories";

/// Base cache key for material listings
pub const MATERIALS_KEY: &str = "materials";

/// Header carrying the admin token
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Builds the materials cache key: the base key when unfiltered, otherwise
/// `materials_<categoryId>`.
pub fn materials_cache_key(category_id: Option<&str>) -> String {
    match category_id {
        Some(id) => format!("{}_{}", MATERIALS_KEY, id),
        None => MATERIALS_KEY.to_string(),
    }
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read-through cache for catalog listings
    pub cache: SharedCache<Value>,
    /// Source of truth consulted on cache misses
    pub catalog: Arc<dyn CatalogRepository>,
    /// Expected admin token, admin routes reject everything when None
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(cache: SharedCache<Value>, catalog: Arc<dyn CatalogRepository>) -> Self {
        Self {
            cache,
            catalog,
            admin_token: None,
        }
    }

    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(Arc::from(token.into()));
        self
    }

    /// Builds the cache and catalog described by the configuration.
    ///
    /// Fails only when a configured seed file cannot be loaded.
    pub fn from_config(config: &Config) -> std::result::Result<Self, CatalogError> {
        let catalog = match &config.catalog_seed_path {
            Some(path) => InMemoryCatalog::from_seed_file(path)?,
            None => InMemoryCatalog::with_default_seed(),
        };
        let cache = SharedCache::new(CacheStore::new(config.max_entries, config.ttl()));

        let mut state = Self::new(cache, Arc::new(catalog));
        state.admin_token = config.admin_token.as_deref().map(Arc::from);
        Ok(state)
    }

    fn require_admin(&self, headers: &HeaderMap) -> Result<()> {
        let Some(expected) = self.admin_token.as_deref() else {
            warn!("admin request rejected: no admin token configured");
            return Err(ApiError::Unauthorized);
        };

        let provided = headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());

        if provided == Some(expected) {
            Ok(())
        } else {
            warn!("admin request rejected: missing or invalid token");
            Err(ApiError::Unauthorized)
        }
    }
}

/// Handler for GET /api/categories
///
/// Serves the category listing from cache, loading it from the catalog on a
/// miss. A catalog failure is logged and answered with an empty list.
pub async fn list_categories_handler(State(state): State<AppState>) -> Json<Vec<Category>> {
    let categories = state
        .cache
        .read_through_json(CATEGORIES_KEY, || state.catalog.list_categories())
        .await
        .unwrap_or_else(|err| {
            error!(error = %err, "failed to load categories");
            Vec::new()
        });

    Json(categories)
}

/// Handler for GET /api/materials?categoryId=
///
/// Same read-through behavior as the categories listing, keyed per category.
pub async fn list_materials_handler(
    State(state): State<AppState>,
    Query(query): Query<MaterialsQuery>,
) -> Json<Vec<Material>> {
    let category_id = query.category_id();
    let key = materials_cache_key(category_id);

    let materials = state
        .cache
        .read_through_json(&key, || state.catalog.list_materials(category_id))
        .await
        .unwrap_or_else(|err| {
            error!(error = %err, category_id, "failed to load materials");
            Vec::new()
        });

    Json(materials)
}

/// Handler for POST /api/admin/categories
///
/// Creates a category and drops the cached category listing so the next read
/// sees it.
pub async fn create_category_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    state.require_admin(&headers)?;

    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let category = state.catalog.create_category(req.into()).await?;
    state.cache.invalidate(CATEGORIES_KEY).await;

    info!(id = %category.id, name = %category.name, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().await.into())
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ClearCacheResponse>> {
    state.require_admin(&headers)?;

    let removed = state.cache.clear().await;
    info!(removed, "cache cleared");
    Ok(Json(ClearCacheResponse::new(removed)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
