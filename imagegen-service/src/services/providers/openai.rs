//! OpenAI image provider implementation.
//!
//! Implements single-image generation against the OpenAI Images API
//! (`POST /v1/images/generations`).

use super::{GeneratedImage, ImageParams, ImageProvider, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// OpenAI API base URL.
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI provider configuration.
#[derive(Debug, Clone)]
pub struct OpenAiImageConfig {
    pub api_key: String,
    pub model: String,
}

/// OpenAI image provider.
pub struct OpenAiImageProvider {
    config: OpenAiImageConfig,
    client: Client,
}

impl OpenAiImageProvider {
    pub fn new(config: OpenAiImageConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl ImageProvider for OpenAiImageProvider {
    async fn generate(
        &self,
        prompt: &str,
        params: &ImageParams,
    ) -> Result<GeneratedImage, ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "OpenAI API key not configured".to_string(),
            ));
        }

        let request = ImageGenerationRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: params.size.clone(),
            quality: params.quality.clone(),
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            size = %params.size,
            "Sending request to OpenAI Images API"
        );

        let response = self
            .client
            .post(format!("{}/images/generations", OPENAI_API_BASE))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            // OpenAI wraps failures in an { "error": { ... } } envelope.
            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
                if envelope.error.code.as_deref() == Some("content_policy_violation") {
                    return Err(ProviderError::ContentFiltered);
                }
                return Err(ProviderError::ApiError(format!(
                    "OpenAI API error {}: {}",
                    status, envelope.error.message
                )));
            }

            return Err(ProviderError::ApiError(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let api_response: ImageGenerationResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let image = api_response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError("Response contained no image".to_string()))?;

        let url = image
            .url
            .ok_or_else(|| ProviderError::ApiError("Response contained no image URL".to_string()))?;

        Ok(GeneratedImage {
            url,
            revised_prompt: image.revised_prompt,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_empty() {
            Err(ProviderError::NotConfigured(
                "OpenAI API key not configured".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// OpenAI API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ImageGenerationRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
    quality: String,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<ImageData>,
    #[serde(default)]
    #[allow(dead_code)]
    created: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    revised_prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}
