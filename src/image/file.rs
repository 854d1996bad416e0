//! File storage for generated styles

use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, info};
use uuid::Uuid;

use super::EncodedImage;
use crate::error::Result;

/// Writes generated images to the output directory
pub struct ImageWriter {
    output_dir: PathBuf,
}

impl ImageWriter {
    /// Create a new writer
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Ensure the output directory exists
    pub async fn ensure_output_dir(&self) -> Result<()> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir).await?;
            debug!(path = ?self.output_dir, "Created output directory");
        }
        Ok(())
    }

    /// Save an encoded image, returning the written path
    pub async fn save(&self, image: &EncodedImage) -> Result<PathBuf> {
        self.ensure_output_dir().await?;

        let data = image.decode()?;
        let extension = extension_for_media_type(image.media_type())
            .or_else(|| detect_media_type(&data).and_then(extension_for_media_type))
            .unwrap_or("png");

        let filename = format!("style-{}.{}", Uuid::new_v4(), extension);
        let file_path = self.output_dir.join(&filename);

        fs::write(&file_path, &data).await?;

        info!(path = ?file_path, size = data.len(), "Saved generated style");

        Ok(file_path)
    }
}

fn extension_for_media_type(media_type: &str) -> Option<&'static str> {
    match media_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/bmp" => Some("bmp"),
        _ => None,
    }
}

/// Detect the media type from binary data using magic bytes
pub(crate) fn detect_media_type(data: &[u8]) -> Option<&'static str> {
    if data.len() < 8 {
        return None;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("image/png");
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    // GIF: GIF87a or GIF89a
    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    // BMP: BM
    if data.starts_with(b"BM") {
        return Some("image/bmp");
    }

    None
}
