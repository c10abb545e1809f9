//! In-memory catalog store.
//!
//! Stands in for the relational database. Seeded at startup either from a
//! built-in data set or from a JSON file.

use std::collections::HashSet;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::models::{CatalogSeed, Category, Material, NewCategory};
use super::repository::{CatalogError, CatalogRepository};

#[derive(Debug)]
pub struct InMemoryCatalog {
    data: RwLock<CatalogSeed>,
}

impl InMemoryCatalog {
    /// Builds a catalog from seed data after checking it is consistent.
    pub fn new(seed: CatalogSeed) -> Result<Self, CatalogError> {
        validate_seed(&seed)?;
        Ok(Self {
            data: RwLock::new(seed),
        })
    }

    pub fn empty() -> Self {
        Self {
            data: RwLock::new(CatalogSeed::default()),
        }
    }

    pub fn with_default_seed() -> Self {
        Self {
            data: RwLock::new(default_seed()),
        }
    }

    /// Loads seed data from a JSON file shaped `{"categories": [...], "materials": [...]}`.
    pub fn from_seed_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Seed(format!("{}: {e}", path.display())))?;
        let seed: CatalogSeed = serde_json::from_str(&raw)
            .map_err(|e| CatalogError::Seed(format!("{}: {e}", path.display())))?;

        info!(
            path = %path.display(),
            categories = seed.categories.len(),
            materials = seed.materials.len(),
            "catalog seed loaded"
        );
        Self::new(seed)
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let mut categories = self.data.read().await.categories.clone();
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(categories)
    }

    async fn list_materials(
        &self,
        category_id: Option<&str>,
    ) -> Result<Vec<Material>, CatalogError> {
        let data = self.data.read().await;
        let mut materials: Vec<Material> = data
            .materials
            .iter()
            .filter(|m| category_id.map_or(true, |id| m.category_id == id))
            .cloned()
            .collect();
        materials.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(materials)
    }

    async fn create_category(&self, new_category: NewCategory) -> Result<Category, CatalogError> {
        let name = new_category.name.trim();
        if name.is_empty() {
            return Err(CatalogError::InvalidInput(
                "Category name cannot be empty".to_string(),
            ));
        }

        let mut data = self.data.write().await;
        let lowered = name.to_lowercase();
        if data
            .categories
            .iter()
            .any(|c| c.name.to_lowercase() == lowered)
        {
            return Err(CatalogError::Conflict(format!("Category '{name}'")));
        }

        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        data.categories.push(category.clone());
        Ok(category)
    }
}

fn validate_seed(seed: &CatalogSeed) -> Result<(), CatalogError> {
    let mut category_ids = HashSet::new();
    for category in &seed.categories {
        if !category_ids.insert(category.id.as_str()) {
            return Err(CatalogError::Seed(format!(
                "duplicate category id '{}'",
                category.id
            )));
        }
    }

    let mut material_ids = HashSet::new();
    for material in &seed.materials {
        if !material_ids.insert(material.id.as_str()) {
            return Err(CatalogError::Seed(format!(
                "duplicate material id '{}'",
                material.id
            )));
        }
        if !category_ids.contains(material.category_id.as_str()) {
            return Err(CatalogError::Seed(format!(
                "material '{}' references unknown category '{}'",
                material.id, material.category_id
            )));
        }
    }
    Ok(())
}

fn default_seed() -> CatalogSeed {
    CatalogSeed {
        categories: vec![
            Category::new("metal", "Metal"),
            Category::new("plastic", "Plastic"),
            Category::new("textile", "Textile"),
            Category::new("wood", "Wood"),
        ],
        materials: vec![
            Material::new("aluminium", "Aluminium", "metal"),
            Material::new("copper", "Copper", "metal"),
            Material::new("steel", "Steel", "metal"),
            Material::new("hdpe", "HDPE", "plastic"),
            Material::new("pet", "PET", "plastic"),
            Material::new("cotton", "Cotton", "textile"),
            Material::new("wool", "Wool", "textile"),
            Material::new("oak", "Oak", "wood"),
            Material::new("pine", "Pine", "wood"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_seed_is_consistent() {
        assert!(validate_seed(&default_seed()).is_ok());
    }

    #[tokio::test]
    async fn test_list_categories_sorted() {
        let catalog = InMemoryCatalog::new(CatalogSeed {
            categories: vec![Category::new("2", "wood"), Category::new("1", "Metal")],
            materials: vec![],
        })
        .unwrap();

        let names: Vec<String> = catalog
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Metal", "wood"]);
    }

    #[tokio::test]
    async fn test_list_materials_by_category() {
        let catalog = InMemoryCatalog::with_default_seed();

        let metals = catalog.list_materials(Some("metal")).await.unwrap();
        assert_eq!(metals.len(), 3);
        assert!(metals.iter().all(|m| m.category_id == "metal"));
        assert_eq!(metals[0].name, "Aluminium");

        let all = catalog.list_materials(None).await.unwrap();
        assert_eq!(all.len(), 9);

        assert!(catalog.list_materials(Some("cat123")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_category() {
        let catalog = InMemoryCatalog::empty();

        let created = catalog
            .create_category(NewCategory {
                name: "  Glass ".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.name, "Glass");
        assert!(Uuid::parse_str(&created.id).is_ok());
        assert_eq!(catalog.list_categories().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_create_duplicate_category_conflicts() {
        let catalog = InMemoryCatalog::with_default_seed();

        let result = catalog
            .create_category(NewCategory {
                name: "metal".to_string(),
            })
            .await;
        assert!(matches!(result, Err(CatalogError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_blank_category_rejected() {
        let catalog = InMemoryCatalog::empty();
        let result = catalog
            .create_category(NewCategory {
                name: "   ".to_string(),
            })
            .await;
        assert!(matches!(result, Err(CatalogError::InvalidInput(_))));
    }

    #[test]
    fn test_seed_with_dangling_material_rejected() {
        let seed = CatalogSeed {
            categories: vec![Category::new("metal", "Metal")],
            materials: vec![Material::new("oak", "Oak", "wood")],
        };
        assert!(matches!(
            InMemoryCatalog::new(seed),
            Err(CatalogError::Seed(_))
        ));
    }

    #[test]
    fn test_from_seed_file() {
        let path = std::env::temp_dir().join(format!("catalog-seed-{}.json", Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{"categories":[{"id":"1","name":"Metal"}],"materials":[{"id":"m1","name":"Tin","categoryId":"1"}]}"#,
        )
        .unwrap();

        let catalog = InMemoryCatalog::from_seed_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(catalog.is_ok());
    }

    #[test]
    fn test_from_missing_seed_file() {
        let result = InMemoryCatalog::from_seed_file(Path::new("/nonexistent/seed.json"));
        assert!(matches!(result, Err(CatalogError::Seed(_))));
    }
}
