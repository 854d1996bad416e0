//! Gemini `generateContent` client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::prompts;
use super::traits::{ComposeRequest, StylingService};
use crate::config::ServiceConfig;
use crate::error::{AppError, Result};
use crate::image::{EncodedImage, FALLBACK_MEDIA_TYPE};
use crate::model::{Category, Classification};
use crate::studio::GenerationMode;

/// HTTP client for the Gemini REST API
pub struct GeminiService {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    analysis_model: String,
    image_model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerateRequest {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<ApiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct ApiContent {
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<ApiInlineData>,
}

impl ApiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn image(image: &EncodedImage) -> Self {
        Self {
            text: None,
            inline_data: Some(ApiInlineData {
                mime_type: image.media_type().to_string(),
                data: image.payload().to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiInlineData {
    #[serde(default, alias = "mime_type")]
    mime_type: String,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ApiImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiImageConfig {
    aspect_ratio: String,
}

#[derive(Debug, Deserialize)]
struct ApiGenerateResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseContent {
    #[serde(default)]
    parts: Vec<ApiResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "inline_data")]
    inline_data: Option<ApiInlineData>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiClassification {
    category: String,
    #[serde(default)]
    description: Option<String>,
}

impl ApiGenerateResponse {
    fn parts(&self) -> impl Iterator<Item = &ApiResponsePart> {
        self.candidates
            .iter()
            .take(1)
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
    }

    /// First inline image of the first candidate
    fn image(&self) -> Option<EncodedImage> {
        self.parts()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| !d.data.is_empty())
            .map(|d| EncodedImage::new(d.data.clone(), FALLBACK_MEDIA_TYPE))
    }

    fn text(&self) -> Option<String> {
        let text: String = self.parts().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl GeminiService {
    /// Create a new client from configuration
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim().trim_end_matches('/').to_string(),
            api_key: config
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            analysis_model: config.analysis_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration(
                "No API key configured. Set WARDROBE_STUDIO__SERVICE__API_KEY or GEMINI_API_KEY and try again."
                    .to_string(),
            )
        })
    }

    fn endpoint_for_model(&self, model: &str) -> String {
        let model = model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    async fn generate_content(
        &self,
        model: &str,
        parts: Vec<ApiPart>,
        generation_config: ApiGenerationConfig,
    ) -> Result<ApiGenerateResponse> {
        let api_key = self.api_key()?;
        let endpoint = self.endpoint_for_model(model);

        let request = ApiGenerateRequest {
            contents: vec![ApiContent { parts }],
            generation_config: Some(generation_config),
        };

        debug!(model = %model, parts = request.contents[0].parts.len(), "Sending generateContent request");

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    AppError::GenerationService(format!("Connection failed to {}: {}", self.api_base, e))
                } else {
                    AppError::HttpClient(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!(model = %model, status = %status, "Service returned an error");
            return Err(AppError::GenerationService(format!(
                "Service returned {}: {}",
                status, message
            )));
        }

        response.json::<ApiGenerateResponse>().await.map_err(|e| {
            AppError::GenerationService(format!("Failed to parse response: {}", e))
        })
    }

    async fn generate_image(
        &self,
        parts: Vec<ApiPart>,
        aspect_ratio: &str,
    ) -> Result<EncodedImage> {
        let config = ApiGenerationConfig {
            image_config: Some(ApiImageConfig {
                aspect_ratio: aspect_ratio.to_string(),
            }),
            ..Default::default()
        };

        let response = self.generate_content(&self.image_model, parts, config).await?;
        response
            .image()
            .ok_or_else(|| AppError::GenerationService("No image generated.".to_string()))
    }
}

/// Parse the classifier's JSON answer
fn parse_classification(text: &str) -> Result<Classification> {
    let raw: ApiClassification = serde_json::from_str(text.trim())
        .map_err(|e| AppError::ClassificationParse(e.to_string()))?;
    let category: Category = raw.category.parse()?;
    let description = raw
        .description
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| crate::model::UNKNOWN_DESCRIPTION.to_string());

    Ok(Classification {
        category,
        description,
    })
}

#[async_trait]
impl StylingService for GeminiService {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn classify(&self, image: &EncodedImage) -> Result<Classification> {
        let categories: Vec<&str> = Category::CLASSIFIABLE.iter().map(|c| c.as_str()).collect();
        let config = ApiGenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(json!({
                "type": "OBJECT",
                "properties": {
                    "category": { "type": "STRING", "enum": categories },
                    "description": { "type": "STRING" }
                }
            })),
            ..Default::default()
        };

        let parts = vec![ApiPart::image(image), ApiPart::text(prompts::classify_prompt())];
        let response = self
            .generate_content(&self.analysis_model, parts, config)
            .await?;

        let text = response
            .text()
            .ok_or_else(|| AppError::ClassificationParse("empty response".to_string()))?;
        parse_classification(&text)
    }

    async fn isolate_subject(&self, image: &EncodedImage) -> Result<EncodedImage> {
        let parts = vec![ApiPart::image(image), ApiPart::text(prompts::ISOLATE_PROMPT)];
        self.generate_image(parts, "1:1").await.map_err(|e| match e {
            AppError::GenerationService(message) => AppError::BackgroundIsolation(message),
            other => other,
        })
    }

    async fn compose(&self, request: ComposeRequest) -> Result<EncodedImage> {
        let mut parts = Vec::with_capacity(request.layers.len() * 2 + 3);

        for (index, layer) in request.layers.iter().enumerate() {
            parts.push(ApiPart::image(&layer.image));
            parts.push(ApiPart::text(prompts::layer_caption(index, layer.hint.label())));
        }

        if let Some(face) = &request.identity_reference {
            parts.push(ApiPart::image(face));
            parts.push(ApiPart::text(prompts::IDENTITY_REFERENCE_PROMPT));
        }

        parts.push(ApiPart::text(prompts::compose_prompt(request.mode)));

        let aspect_ratio = match request.mode {
            GenerationMode::Avatar => "1:1",
            GenerationMode::FlatLay => "3:4",
        };

        self.generate_image(parts, aspect_ratio).await
    }

    async fn create_avatar(&self, face: &EncodedImage) -> Result<EncodedImage> {
        let parts = vec![ApiPart::image(face), ApiPart::text(prompts::AVATAR_FACE_PROMPT)];
        self.generate_image(parts, "1:1").await
    }
}
