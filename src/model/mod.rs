//! Domain model - categories, garments, classification results and profile

pub mod catalog;
pub mod category;
pub mod garment;

use serde::{Deserialize, Serialize};

use crate::image::EncodedImage;

pub use catalog::{Catalog, CatalogItem};
pub use category::Category;
pub use garment::{GarmentId, GarmentRecord, Provenance};

/// Description substituted when classification cannot be trusted
pub const UNKNOWN_DESCRIPTION: &str = "Unknown item";

/// Result of analysing a garment image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub description: String,
}

impl Classification {
    /// Fail-closed default for malformed classifier output
    pub fn fallback() -> Self {
        Self {
            category: Category::Accessory,
            description: UNKNOWN_DESCRIPTION.to_string(),
        }
    }
}

/// User profile data
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    /// Stylized face generated from the user's selfie
    pub avatar_image: Option<EncodedImage>,
}
