//! Request and Response models for the catalog API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{CreateCategoryRequest, MaterialsQuery, MAX_CATEGORY_NAME_LENGTH};
pub use responses::{ClearCacheResponse, ErrorResponse, HealthResponse, StatsResponse};
