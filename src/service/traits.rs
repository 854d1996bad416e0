//! Common traits and types for the generative styling service

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::image::EncodedImage;
use crate::model::Classification;
use crate::studio::GenerationMode;

/// Position of a garment in the layering order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerHint {
    /// First garment, worn innermost
    Base,
    /// Any later garment, worn over the previous ones
    Outer,
}

impl LayerHint {
    /// Hint for the garment at `index` in layering order
    pub fn for_index(index: usize) -> Self {
        if index == 0 {
            LayerHint::Base
        } else {
            LayerHint::Outer
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LayerHint::Base => "Inner/Base",
            LayerHint::Outer => "Outer",
        }
    }
}

/// One garment image tagged with its layer
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInput {
    pub image: EncodedImage,
    pub hint: LayerHint,
}

/// Request to compose a styled image
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    /// Garments in layering order
    pub layers: Vec<LayerInput>,
    pub mode: GenerationMode,
    /// Face whose identity must be preserved exactly
    pub identity_reference: Option<EncodedImage>,
}

/// Trait for generative image/analysis services
#[async_trait]
pub trait StylingService: Send + Sync {
    /// Get the service name
    fn name(&self) -> &str;

    /// Categorize a garment image
    async fn classify(&self, image: &EncodedImage) -> Result<Classification>;

    /// Return the garment with its background removed
    async fn isolate_subject(&self, image: &EncodedImage) -> Result<EncodedImage>;

    /// Compose the styled outfit image
    async fn compose(&self, request: ComposeRequest) -> Result<EncodedImage>;

    /// Generate a stylized avatar face from a selfie
    async fn create_avatar(&self, face: &EncodedImage) -> Result<EncodedImage>;
}
