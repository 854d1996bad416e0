//! Image handling module - canonical encoded images, base64 helpers,
//! upload normalization and saving generated output

pub mod base64;
pub mod file;
pub mod normalizer;

use serde::{Deserialize, Serialize};

pub use file::ImageWriter;
pub use normalizer::{normalize, RawUpload};

/// Media type assumed whenever none can be discovered
pub const FALLBACK_MEDIA_TYPE: &str = "image/png";

/// Canonical representation of an image shared by every consumer:
/// a base64 payload plus its media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    payload: String,
    media_type: String,
}

impl EncodedImage {
    /// Build from an already base64-encoded payload.
    ///
    /// The media type is reduced to its bare `type/subtype`; one that a data
    /// URI could not carry becomes [`FALLBACK_MEDIA_TYPE`].
    pub fn new(payload: impl Into<String>, media_type: impl Into<String>) -> Self {
        let media_type = media_type.into();
        Self {
            payload: payload.into(),
            media_type: base64::canonical_media_type(&media_type)
                .unwrap_or(FALLBACK_MEDIA_TYPE)
                .to_string(),
        }
    }

    /// Encode raw bytes
    pub fn from_bytes(data: &[u8], media_type: impl Into<String>) -> Self {
        Self::new(base64::encode(data), media_type)
    }

    /// Recover `(payload, media_type)` from a displayable URI.
    ///
    /// Accepts either `data:<type>;base64,<payload>` or a bare payload. When
    /// no type tag can be discovered the media type falls back to
    /// [`FALLBACK_MEDIA_TYPE`]. Never fails.
    pub fn from_uri(uri: &str) -> Self {
        let payload = match uri.split_once(',') {
            Some((_, payload)) => payload,
            None => uri,
        };
        let media_type = base64::media_type_from_data_uri(uri).unwrap_or(FALLBACK_MEDIA_TYPE);

        Self {
            payload: payload.to_string(),
            media_type: media_type.to_string(),
        }
    }

    /// Displayable `data:` URI for this image
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.payload)
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Decoded image bytes
    pub fn decode(&self) -> crate::Result<Vec<u8>> {
        base64::decode(&self.payload)
    }
}
