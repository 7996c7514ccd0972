//! Image provider abstractions and implementations.
//!
//! This module provides a trait-based abstraction for image backends,
//! allowing easy swapping between different providers (OpenAI, mock).

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Parameters applied identically to every call of a fan-out.
#[derive(Debug, Clone)]
pub struct ImageParams {
    /// Image size (e.g., "1024x1024").
    pub size: String,

    /// Quality tier ("standard" or "hd").
    pub quality: String,
}

/// One generated image reference.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// URL of the image asset, hosted by the provider.
    pub url: String,

    /// Prompt rewrite reported by the provider, when it does one.
    pub revised_prompt: Option<String>,
}

/// Trait for image generation providers (e.g., OpenAI).
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate a single image for the prompt.
    async fn generate(
        &self,
        prompt: &str,
        params: &ImageParams,
    ) -> Result<GeneratedImage, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
