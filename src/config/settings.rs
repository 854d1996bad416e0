//! Application settings and configuration management

use crate::error::{AppError, Result};
use crate::studio::CompositionPolicy;
use crate::wardrobe::UploadPolicy;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variables consulted for the service credential when the
/// settings do not carry one
const API_KEY_FALLBACK_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub studio: StudioConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generative service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model used for garment classification (text output)
    #[serde(default = "default_analysis_model")]
    pub analysis_model: String,
    /// Model used for every image-producing call
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_analysis_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_timeout() -> u64 {
    120000
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            analysis_model: default_analysis_model(),
            image_model: default_image_model(),
            timeout_ms: default_timeout(),
        }
    }
}

/// Upload pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub policy: UploadPolicy,
    #[serde(default = "default_true")]
    pub isolate_background: bool,
    #[serde(default = "default_true")]
    pub auto_classify: bool,
}

fn default_true() -> bool {
    true
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            policy: UploadPolicy::default(),
            isolate_background: true,
            auto_classify: true,
        }
    }
}

/// Studio configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StudioConfig {
    #[serde(default)]
    pub policy: CompositionPolicy,
}

/// Output configuration for saved generations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

fn default_output_dir() -> String {
    "./generated_styles".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .set_default("service.timeout_ms", default_timeout())?
            .set_default("upload.policy", "sequential")?
            .set_default("studio.policy", "ordered")?
            // Load from configuration file
            .add_source(File::with_name(path.as_ref().to_str().unwrap_or("config/default")).required(false))
            // Override with environment variables (prefixed with WARDROBE_STUDIO_)
            .add_source(
                Environment::with_prefix("WARDROBE_STUDIO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;
        if settings.service.api_key.is_none() {
            settings.service.api_key = API_KEY_FALLBACK_VARS
                .iter()
                .find_map(|var| std::env::var(var).ok())
                .filter(|key| !key.trim().is_empty());
        }
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.service.api_base.trim().is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "Service api_base cannot be empty".to_string(),
            )));
        }

        if self.service.timeout_ms == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Service timeout_ms cannot be 0".to_string(),
            )));
        }

        for (field, model) in [
            ("analysis_model", &self.service.analysis_model),
            ("image_model", &self.service.image_model),
        ] {
            if model.trim().is_empty() {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Service {} cannot be empty",
                    field
                ))));
            }
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err(AppError::Config(config::ConfigError::Message(format!(
                "Invalid log format '{}'. Must be 'json' or 'pretty'",
                self.logging.format
            ))));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            upload: UploadConfig::default(),
            studio: StudioConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
