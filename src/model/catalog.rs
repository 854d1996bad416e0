//! Catalog items that can be imported into the wardrobe

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::category::Category;
use super::garment::{GarmentId, GarmentRecord, Provenance};
use crate::error::Result;

/// A purchasable item from a shop catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub image: String,
    pub category: Category,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub brand: Option<String>,
}

impl CatalogItem {
    /// Turn the catalog entry into an owned garment with a fresh id
    pub fn import(&self) -> GarmentRecord {
        GarmentRecord {
            id: GarmentId::for_catalog(&self.id),
            image: self.image.clone(),
            category: self.category,
            description: self.description.clone(),
            provenance: Provenance::Catalog,
            price: self.price,
            brand: self.brand.clone(),
        }
    }
}

/// Collection of catalog items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub items: Vec<CatalogItem>,
}

impl Catalog {
    /// Parse a catalog from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref()).await?;
        let catalog = Self::from_json(&raw)?;
        debug!(path = ?path.as_ref(), items = catalog.items.len(), "Loaded catalog");
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }
}
