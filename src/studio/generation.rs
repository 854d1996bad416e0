//! Generation orchestrator - turns the studio composition into a single
//! styling request and tracks its loading, error and result state

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::image::EncodedImage;
use crate::model::GarmentRecord;
use crate::service::{ComposeRequest, LayerHint, LayerInput, StylingService};
use crate::state::ProcessingTracker;

/// Which styling profile to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Full-body 3D avatar wearing the outfit
    Avatar,
    /// Lay-flat photo arrangement of the garments
    FlatLay,
}

impl GenerationMode {
    /// Status text shown while the request is in flight
    pub fn status_message(&self) -> &'static str {
        match self {
            GenerationMode::Avatar => "Designing your 3D Outfit...",
            GenerationMode::FlatLay => "Arranging your 2D Outfit Grid...",
        }
    }

    /// Whether the profile face is sent along as an identity reference
    pub fn uses_identity_reference(&self) -> bool {
        match self {
            GenerationMode::Avatar => true,
            GenerationMode::FlatLay => false,
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationMode::Avatar => f.write_str("avatar"),
            GenerationMode::FlatLay => f.write_str("flat-lay"),
        }
    }
}

impl FromStr for GenerationMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "avatar" => Ok(GenerationMode::Avatar),
            "flat-lay" | "flatlay" | "real" | "layout" => Ok(GenerationMode::FlatLay),
            other => Err(AppError::Configuration(format!(
                "Unknown generation mode '{}'. Use 'avatar' or 'flat-lay'",
                other
            ))),
        }
    }
}

/// Last outcome visible to the presentation layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOutput {
    pub image: Option<EncodedImage>,
    pub error: Option<String>,
}

/// Issues styling requests one at a time
pub struct GenerationOrchestrator {
    service: Arc<dyn StylingService>,
    processing: Arc<ProcessingTracker>,
    output: RwLock<GenerationOutput>,
}

impl GenerationOrchestrator {
    pub fn new(service: Arc<dyn StylingService>, processing: Arc<ProcessingTracker>) -> Self {
        Self {
            service,
            processing,
            output: RwLock::new(GenerationOutput::default()),
        }
    }

    /// Tag each garment image with its layer, preserving order
    pub fn build_layers(items: &[GarmentRecord]) -> Vec<LayerInput> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| LayerInput {
                image: item.encoded_image(),
                hint: LayerHint::for_index(index),
            })
            .collect()
    }

    /// Request a styled image for `items` (in layering order).
    ///
    /// Fails with [`AppError::EmptySelection`] without contacting the
    /// service when `items` is empty, and with [`AppError::Busy`] while
    /// another request holds the processing state. A failed call keeps the
    /// previously generated image.
    pub async fn generate(
        &self,
        items: &[GarmentRecord],
        mode: GenerationMode,
        identity_reference: Option<EncodedImage>,
    ) -> Result<EncodedImage> {
        if items.is_empty() {
            let err = AppError::EmptySelection;
            self.output.write().error = Some(err.user_message());
            return Err(err);
        }

        let layers = Self::build_layers(items);
        let _guard = self.processing.begin(mode.status_message())?;

        info!(
            mode = %mode,
            layers = layers.len(),
            identity_reference = identity_reference.is_some(),
            service = self.service.name(),
            "Requesting styled image"
        );

        let request = ComposeRequest {
            layers,
            mode,
            identity_reference,
        };

        match self.service.compose(request).await {
            Ok(image) => {
                let mut output = self.output.write();
                output.image = Some(image.clone());
                output.error = None;
                info!(mode = %mode, "Styled image generated");
                Ok(image)
            }
            Err(e) => {
                warn!(mode = %mode, error = %e, "Styled image generation failed");
                self.output.write().error = Some(e.user_message());
                Err(e)
            }
        }
    }

    pub fn output(&self) -> GenerationOutput {
        self.output.read().clone()
    }

    pub fn last_image(&self) -> Option<EncodedImage> {
        self.output.read().image.clone()
    }

    pub fn dismiss_error(&self) {
        self.output.write().error = None;
    }
}
