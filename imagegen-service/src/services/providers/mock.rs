//! Mock provider implementation for testing and keyless local runs.

use super::{GeneratedImage, ImageParams, ImageProvider, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock image provider. Returns deterministic URLs numbered by call order.
pub struct MockImageProvider {
    enabled: bool,
    calls: AtomicUsize,
}

impl MockImageProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of generate calls issued so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    async fn generate(
        &self,
        prompt: &str,
        _params: &ImageParams,
    ) -> Result<GeneratedImage, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock image provider not enabled".to_string(),
            ));
        }

        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        // Simulate some processing
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

        Ok(GeneratedImage {
            url: format!("https://images.example.com/generated/{}.png", call),
            revised_prompt: Some(format!("Mock rendition of: {}", prompt)),
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock image provider not enabled".to_string(),
            ))
        }
    }
}
