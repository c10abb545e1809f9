//! Catalog records served by the read endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A listing category, e.g. "Metal" or "Textiles".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// A material type offered under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub name: String,
    pub category_id: String,
}

impl Material {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category_id: category_id.into(),
        }
    }
}

/// Input for creating a category. The name is trimmed before storage.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
}

/// Initial catalog contents, as loaded from a seed file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub materials: Vec<Material>,
}
