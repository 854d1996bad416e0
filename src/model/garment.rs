//! Garment records and their identifiers

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::Category;
use crate::image::EncodedImage;

/// Unique garment identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GarmentId(String);

impl GarmentId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh id for a captured garment: millisecond timestamp plus a random
    /// suffix, so collisions are negligible
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u64 = rand::thread_rng().gen();
        Self(format!("{}-{:016x}", millis, suffix))
    }

    /// Id for an item imported from the catalog
    pub fn for_catalog(catalog_id: &str) -> Self {
        Self(format!(
            "{}-{}",
            catalog_id,
            chrono::Utc::now().timestamp_millis()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GarmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GarmentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Where a garment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Captured,
    Catalog,
}

/// A categorized, owned clothing image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarmentRecord {
    pub id: GarmentId,
    /// Displayable `data:` URI
    pub image: String,
    pub category: Category,
    #[serde(default)]
    pub description: Option<String>,
    pub provenance: Provenance,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub brand: Option<String>,
}

impl GarmentRecord {
    /// Record for an image the user captured
    pub fn captured(image: &EncodedImage, category: Category, description: Option<String>) -> Self {
        Self {
            id: GarmentId::generate(),
            image: image.to_data_uri(),
            category,
            description,
            provenance: Provenance::Captured,
            price: None,
            brand: None,
        }
    }

    /// Canonical encoded form of the record's image
    pub fn encoded_image(&self) -> EncodedImage {
        EncodedImage::from_uri(&self.image)
    }
}
