//! Source-of-truth interface for catalog data.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Category, Material, NewCategory};

#[derive(Error, Debug)]
pub enum CatalogError {
    /// A record with the same identity already exists
    #[error("{0} already exists")]
    Conflict(String),

    #[error("{0}")]
    InvalidInput(String),

    /// Seed data could not be loaded or is inconsistent
    #[error("Invalid catalog seed: {0}")]
    Seed(String),

    /// The backing store could not be reached
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Repository interface for categories and material types.
///
/// Handlers never call this directly on the read path; they go through the
/// shared cache and only reach the repository on a miss.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Lists all categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError>;

    /// Lists material types ordered by name, restricted to one category when
    /// `category_id` is given. An unknown category yields an empty list.
    async fn list_materials(&self, category_id: Option<&str>)
        -> Result<Vec<Material>, CatalogError>;

    /// Creates a category.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Conflict`] if a category with the same name
    /// (ignoring case) already exists.
    async fn create_category(&self, new_category: NewCategory) -> Result<Category, CatalogError>;
}
