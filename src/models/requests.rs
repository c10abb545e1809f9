//! Request DTOs for the catalog API
//!
//! Defines incoming JSON bodies and query strings.

use serde::Deserialize;

use crate::catalog::NewCategory;

/// Maximum length of a category name, in characters
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

/// Request body for `POST /api/admin/categories`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryRequest {
    /// Display name of the new category
    pub name: String,
}

impl CreateCategoryRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Some("Category name cannot be empty".to_string());
        }
        if name.chars().count() > MAX_CATEGORY_NAME_LENGTH {
            return Some(format!(
                "Category name exceeds maximum length of {} characters",
                MAX_CATEGORY_NAME_LENGTH
            ));
        }
        None
    }
}

impl From<CreateCategoryRequest> for NewCategory {
    fn from(req: CreateCategoryRequest) -> Self {
        NewCategory {
            name: req.name.trim().to_string(),
        }
    }
}

/// Query string for `GET /api/materials`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialsQuery {
    /// Restricts the listing to one category
    #[serde(rename = "categoryId", default)]
    pub category_id: Option<String>,
}

impl MaterialsQuery {
    /// The category filter, ignoring a blank parameter.
    pub fn category_id(&self) -> Option<&str> {
        self.category_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
