//! Service module - the styling service trait, its Gemini transport and the
//! best-effort wrappers used during ingestion

pub mod gemini;
pub mod prompts;
pub mod traits;

use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::image::EncodedImage;
use crate::model::Classification;

pub use gemini::GeminiService;
pub use traits::{ComposeRequest, LayerHint, LayerInput, StylingService};

/// Classify, substituting `{Accessory, "Unknown item"}` for anything but a
/// configuration error. Unparseable answers are logged apart from transport
/// failures so upstream contract violations stay visible.
pub async fn classify_or_default(
    service: &dyn StylingService,
    image: &EncodedImage,
) -> Result<Classification> {
    match service.classify(image).await {
        Ok(classification) => {
            debug!(
                category = %classification.category,
                description = %classification.description,
                "Garment classified"
            );
            Ok(classification)
        }
        Err(e) if e.is_configuration() => Err(e),
        Err(AppError::ClassificationParse(reason)) => {
            warn!(
                service = service.name(),
                reason = %reason,
                outcome = "fallback_unparseable",
                "Classifier returned malformed data; using default category"
            );
            Ok(Classification::fallback())
        }
        Err(e) => {
            warn!(
                service = service.name(),
                error = %e,
                outcome = "fallback_failed",
                "Classification failed; using default category"
            );
            Ok(Classification::fallback())
        }
    }
}

/// Remove the background, falling back to the original image when the
/// service cannot. The flag reports whether isolation succeeded.
pub async fn isolate_or_original(
    service: &dyn StylingService,
    image: EncodedImage,
) -> Result<(EncodedImage, bool)> {
    match service.isolate_subject(&image).await {
        Ok(isolated) => Ok((isolated, true)),
        Err(e) if e.is_configuration() => Err(e),
        Err(e) => {
            warn!(service = service.name(), error = %e, "Background isolation failed; keeping original image");
            Ok((image, false))
        }
    }
}
