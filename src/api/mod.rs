//! API Module
//!
//! HTTP handlers and routing for the catalog service.
//!
//! # Endpoints
//! - `GET /api/categories` - Category listing
//! - `GET /api/materials` - Material listing, optionally by `categoryId`
//! - `POST /api/admin/categories` - Create a category
//! - `GET /cache/stats` - Cache statistics
//! - `DELETE /cache` - Clear the cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
