//! Common error types for the wardrobe studio

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// A required service credential or setting is missing
    #[error("Service not configured: {0}")]
    Configuration(String),

    #[error("Could not parse classification response: {0}")]
    ClassificationParse(String),

    #[error("Background isolation failed: {0}")]
    BackgroundIsolation(String),

    #[error("Please select or upload items first.")]
    EmptySelection,

    #[error("Generation failed: {0}")]
    GenerationService(String),

    #[error("Another request is already in progress: {0}")]
    Busy(String),

    #[error("Garment already exists: {0}")]
    DuplicateGarment(String),

    #[error("Invalid image data: {0}")]
    InvalidImage(String),
}

impl AppError {
    /// Errors that must never be swallowed by best-effort steps
    pub fn is_configuration(&self) -> bool {
        matches!(self, AppError::Configuration(_) | AppError::Config(_))
    }

    /// Message suitable for a user-visible notice
    pub fn user_message(&self) -> String {
        match self {
            AppError::GenerationService(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
