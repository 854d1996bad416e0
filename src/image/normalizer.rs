//! Converts raw uploaded image bytes into an [`EncodedImage`]

use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::base64::canonical_media_type;
use super::file::detect_media_type;
use super::{EncodedImage, FALLBACK_MEDIA_TYPE};
use crate::error::Result;

/// Where the bytes of an upload come from
#[derive(Debug, Clone)]
enum UploadSource {
    Bytes(Vec<u8>),
    File(PathBuf),
}

/// Raw image as handed over by the capture collaborator: bytes (or a path
/// to read them from) plus the declared media type.
#[derive(Debug, Clone)]
pub struct RawUpload {
    name: String,
    media_type: Option<String>,
    source: UploadSource,
}

impl RawUpload {
    /// In-memory upload
    pub fn from_bytes(
        name: impl Into<String>,
        bytes: Vec<u8>,
        media_type: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type,
            source: UploadSource::Bytes(bytes),
        }
    }

    /// Upload read from disk when normalized
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            media_type: media_type_from_extension(path).map(str::to_string),
            source: UploadSource::File(path.to_path_buf()),
        }
    }

    /// Replace the name reported for this upload
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }
}

/// Normalize an upload into its canonical encoded form.
///
/// Fails only when the bytes cannot be read (missing file, read error or an
/// empty upload).
pub async fn normalize(upload: RawUpload) -> Result<EncodedImage> {
    let RawUpload {
        name,
        media_type,
        source,
    } = upload;

    let bytes = match source {
        UploadSource::Bytes(bytes) => bytes,
        UploadSource::File(path) => fs::read(&path).await?,
    };

    if bytes.is_empty() {
        return Err(IoError::new(
            ErrorKind::UnexpectedEof,
            format!("upload '{}' contains no image data", name),
        )
        .into());
    }

    // Declared types must survive a data URI round trip
    let media_type = media_type
        .as_deref()
        .and_then(canonical_media_type)
        .or_else(|| detect_media_type(&bytes))
        .unwrap_or(FALLBACK_MEDIA_TYPE)
        .to_string();

    debug!(upload = %name, media_type = %media_type, size = bytes.len(), "Normalized upload");

    Ok(EncodedImage::from_bytes(&bytes, media_type))
}

fn media_type_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}
