//! Garment categories, used both as classifier output and as studio slot keys

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Closed set of garment categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Top,
    Bottom,
    #[serde(rename = "One-Piece")]
    OnePiece,
    Shoes,
    Bag,
    Accessory,
    Outerwear,
    Dresses,
}

impl Category {
    /// Every category
    pub const ALL: [Category; 8] = [
        Category::Top,
        Category::Bottom,
        Category::OnePiece,
        Category::Shoes,
        Category::Bag,
        Category::Accessory,
        Category::Outerwear,
        Category::Dresses,
    ];

    /// Categories the classifier is allowed to answer with
    pub const CLASSIFIABLE: [Category; 7] = [
        Category::Top,
        Category::Bottom,
        Category::OnePiece,
        Category::Shoes,
        Category::Bag,
        Category::Accessory,
        Category::Outerwear,
    ];

    /// Slot enumeration order used when rendering a slot composition.
    /// Upper-body garments share the position after accessories.
    pub const SLOT_ORDER: [Category; 8] = [
        Category::Accessory,
        Category::Top,
        Category::Outerwear,
        Category::OnePiece,
        Category::Dresses,
        Category::Bottom,
        Category::Shoes,
        Category::Bag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Top => "Top",
            Category::Bottom => "Bottom",
            Category::OnePiece => "One-Piece",
            Category::Shoes => "Shoes",
            Category::Bag => "Bag",
            Category::Accessory => "Accessory",
            Category::Outerwear => "Outerwear",
            Category::Dresses => "Dresses",
        }
    }

    /// Position of this category in [`Category::SLOT_ORDER`]
    pub fn slot_rank(&self) -> usize {
        match self {
            Category::Accessory => 0,
            Category::Top => 1,
            Category::Outerwear => 2,
            Category::OnePiece => 3,
            Category::Dresses => 4,
            Category::Bottom => 5,
            Category::Shoes => 6,
            Category::Bag => 7,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "top" => Ok(Category::Top),
            "bottom" => Ok(Category::Bottom),
            "onepiece" => Ok(Category::OnePiece),
            "shoes" => Ok(Category::Shoes),
            "bag" => Ok(Category::Bag),
            "accessory" => Ok(Category::Accessory),
            "outerwear" => Ok(Category::Outerwear),
            "dresses" | "dress" => Ok(Category::Dresses),
            _ => Err(AppError::ClassificationParse(format!(
                "unknown category '{}'",
                s
            ))),
        }
    }
}
