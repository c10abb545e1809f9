//! Catalog Module
//!
//! Categories and material types, plus the source-of-truth behind the cache.

mod memory;
mod models;
mod repository;

pub use memory::InMemoryCatalog;
pub use models::{CatalogSeed, Category, Material, NewCategory};
pub use repository::{CatalogError, CatalogRepository};
