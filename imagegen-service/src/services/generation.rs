//! All-or-nothing fan-out over the image provider.
//!
//! Each submission turns into a fixed number of concurrent provider calls.
//! Results are collected indexed by issuing order; a single bad slot fails
//! the whole batch and no partial set is ever handed back.

use crate::services::providers::{ImageParams, ImageProvider, ProviderError};
use futures::future;
use std::sync::Arc;

/// Number of images generated per submission.
pub const IMAGES_PER_REQUEST: usize = 4;

#[derive(Clone)]
pub struct ImageGenerator {
    provider: Arc<dyn ImageProvider>,
    params: ImageParams,
}

impl ImageGenerator {
    pub fn new(provider: Arc<dyn ImageProvider>, params: ImageParams) -> Self {
        Self { provider, params }
    }

    /// Generate one image per slot with identical parameters.
    ///
    /// The returned URLs are ordered by issuing slot, not by completion
    /// order. All calls run to completion before the batch is judged; a
    /// failed or URL-less slot fails the batch after the join.
    pub async fn generate_set(&self, prompt: &str) -> Result<Vec<String>, ProviderError> {
        let calls = (0..IMAGES_PER_REQUEST).map(|slot| {
            let provider = Arc::clone(&self.provider);
            let params = self.params.clone();
            let prompt = prompt.to_string();
            async move {
                let result = provider.generate(&prompt, &params).await;
                (slot, result)
            }
        });

        // join_all keeps future order, so results stay indexed by slot.
        let results = future::join_all(calls).await;

        let mut urls = Vec::with_capacity(IMAGES_PER_REQUEST);
        for (slot, result) in results {
            match result {
                Ok(image) => {
                    if let Some(revised) = &image.revised_prompt {
                        tracing::debug!(slot, revised_prompt = %revised, "Provider revised the prompt");
                    }
                    urls.push(image.url);
                }
                Err(e) => {
                    tracing::error!(slot, error = %e, "Image generation call failed");
                    return Err(e);
                }
            }
        }

        if urls.len() != IMAGES_PER_REQUEST {
            return Err(ProviderError::ApiError(format!(
                "Expected {} images, got {}",
                IMAGES_PER_REQUEST,
                urls.len()
            )));
        }

        Ok(urls)
    }

    /// Health of the underlying provider.
    pub async fn health_check(&self) -> Result<(), ProviderError> {
        self.provider.health_check().await
    }
}
