//! Catalog Cache - marketplace reference data service
//!
//! Serves listing categories and material types through an in-process
//! read-through cache in front of the catalog store.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::SharedCache;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
