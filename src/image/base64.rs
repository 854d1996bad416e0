//! Base64 encoding and decoding utilities

use base64::{engine::general_purpose::STANDARD, Engine};
use crate::error::{AppError, Result};

/// Encode binary data to base64 string
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode base64 string to binary data
pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    // Handle data URL format (e.g., "data:image/png;base64,...")
    let data = match encoded.split_once(',') {
        Some((_, payload)) => payload,
        None => encoded,
    };

    STANDARD
        .decode(data.trim())
        .map_err(|e| AppError::InvalidImage(format!("Invalid base64 data: {}", e)))
}

/// Get the full media type (e.g. `image/png`) from a data URL prefix.
///
/// Only well-formed `type/subtype` tags are recognised; anything else
/// yields `None`.
pub fn media_type_from_data_uri(data_url: &str) -> Option<&str> {
    let rest = data_url.strip_prefix("data:")?;
    let end = rest.find(|c| c == ';' || c == ',')?;
    let media_type = &rest[..end];

    is_media_type(media_type).then_some(media_type)
}

/// Reduce a declared media type to the bare `type/subtype` token a data URL
/// can carry, dropping parameters such as `; charset=binary`.
///
/// Returns `None` when the token would not be recognised by
/// [`media_type_from_data_uri`].
pub fn canonical_media_type(declared: &str) -> Option<&str> {
    let essence = declared.split(';').next().unwrap_or_default().trim();
    is_media_type(essence).then_some(essence)
}

fn is_media_type(token: &str) -> bool {
    let Some((kind, subtype)) = token.split_once('/') else {
        return false;
    };

    let kind_ok = !kind.is_empty() && kind.chars().all(|c| c.is_ascii_alphanumeric());
    let subtype_ok = !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '+'));

    kind_ok && subtype_ok
}
