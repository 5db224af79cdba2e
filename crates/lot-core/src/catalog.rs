//! Catalog of placeable items
//!
//! Read-only, in-memory lookup from catalog id to item definition. Loading
//! the catalog from storage is the host application's job.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::geometry::Footprint;

/// Broad item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Furniture,
    Decor,
    Appliance,
    Plumbing,
    Lighting,
    Door,
    Window,
    Structure,
    #[serde(other)]
    Other,
}

impl Category {
    /// Doors and windows must be set into a wall
    pub fn mounts_in_wall(&self) -> bool {
        matches!(self, Category::Door | Category::Window)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Furniture => "Furniture",
            Category::Decor => "Decor",
            Category::Appliance => "Appliance",
            Category::Plumbing => "Plumbing",
            Category::Lighting => "Lighting",
            Category::Door => "Door",
            Category::Window => "Window",
            Category::Structure => "Structure",
            Category::Other => "Other",
        }
    }
}

/// Tag marking items that must stand against a wall
pub const TAG_NEEDS_WALL: &str = "needs_wall";

/// Definition of a placeable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    /// Occupied shape; items without one occupy a single point
    #[serde(default)]
    pub footprint: Option<Footprint>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub price: f64,
}

impl CatalogItem {
    pub fn new(id: impl Into<String>, footprint: Footprint, price: f64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            footprint: Some(footprint),
            category: Category::default(),
            tags: Vec::new(),
            price,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether placement requires a wall directly behind the item
    pub fn needs_wall(&self) -> bool {
        self.has_tag(TAG_NEEDS_WALL) || self.category.mounts_in_wall()
    }
}

/// Item definitions keyed by catalog id
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: HashMap<String, Arc<CatalogItem>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an item definition
    pub fn insert(&mut self, item: CatalogItem) -> Arc<CatalogItem> {
        let item = Arc::new(item);
        self.items.insert(item.id.clone(), item.clone());
        item
    }

    pub fn get(&self, id: &str) -> Option<&Arc<CatalogItem>> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CatalogItem>> {
        self.items.values()
    }
}

impl FromIterator<CatalogItem> for Catalog {
    fn from_iter<I: IntoIterator<Item = CatalogItem>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for item in iter {
            catalog.insert(item);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_wall() {
        let shelf = CatalogItem::new("shelf", Footprint::boxed(1.0, 0.5, 2.0), 80.0)
            .with_tag(TAG_NEEDS_WALL);
        let door = CatalogItem::new("door", Footprint::boxed(1.0, 0.2, 2.2), 150.0)
            .with_category(Category::Door);
        let sofa = CatalogItem::new("sofa", Footprint::boxed(2.0, 1.0, 1.0), 400.0);

        assert!(shelf.needs_wall());
        assert!(door.needs_wall());
        assert!(!sofa.needs_wall());
    }

    #[test]
    fn test_unknown_category_deserializes_as_other() {
        let item: CatalogItem =
            serde_json::from_str(r#"{"id":"x","name":"X","category":"spaceship"}"#).unwrap();
        assert_eq!(item.category, Category::Other);
        assert_eq!(item.footprint, None);
        assert_eq!(item.price, 0.0);
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog: Catalog = [
            CatalogItem::new("a", Footprint::boxed(1.0, 1.0, 1.0), 1.0),
            CatalogItem::new("b", Footprint::boxed(2.0, 2.0, 1.0), 2.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("b").map(|i| i.price), Some(2.0));
        assert!(catalog.get("c").is_none());
    }
}
