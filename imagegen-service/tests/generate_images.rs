//! Endpoint tests for the all-or-nothing generation contract.
//!
//! These route requests in-process against mock providers; no network.
//! Run with: cargo test -p imagegen-service --test generate_images

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use imagegen_service::config::{AppConfig, OpenAiSettings, ProviderKind, ServerConfig};
use imagegen_service::services::generation::{ImageGenerator, IMAGES_PER_REQUEST};
use imagegen_service::services::providers::mock::MockImageProvider;
use imagegen_service::services::providers::openai::{OpenAiImageConfig, OpenAiImageProvider};
use imagegen_service::services::providers::{
    GeneratedImage, ImageParams, ImageProvider, ProviderError,
};
use imagegen_service::startup::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig { port: 0 },
        provider: ProviderKind::Mock,
        openai: OpenAiSettings {
            api_key: "test-api-key".to_string(),
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
            quality: "hd".to_string(),
        },
    }
}

fn test_app(provider: Arc<dyn ImageProvider>) -> Router {
    let params = ImageParams {
        size: "1024x1024".to_string(),
        quality: "hd".to_string(),
    };
    let state = AppState {
        config: test_config(),
        generator: ImageGenerator::new(provider, params),
    };
    build_router(state)
}

async fn post_generate(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/images/generate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Fails exactly one call; the other slots still produce URLs.
struct FlakyImageProvider {
    fail_call: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl ImageProvider for FlakyImageProvider {
    async fn generate(
        &self,
        _prompt: &str,
        _params: &ImageParams,
    ) -> Result<GeneratedImage, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_call {
            return Err(ProviderError::ApiError(
                "Upstream returned no image".to_string(),
            ));
        }
        Ok(GeneratedImage {
            url: format!("https://images.example.com/{}.png", call),
            revised_prompt: None,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Completes later-issued calls first to expose ordering bugs.
struct ReversedDelayProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageProvider for ReversedDelayProvider {
    async fn generate(
        &self,
        _prompt: &str,
        _params: &ImageParams,
    ) -> Result<GeneratedImage, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = 40 * (IMAGES_PER_REQUEST - call) as u64;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(GeneratedImage {
            url: format!("https://images.example.com/slot/{}.png", call),
            revised_prompt: None,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[tokio::test]
async fn valid_prompt_returns_four_urls() {
    let mock = Arc::new(MockImageProvider::new(true));
    let app = test_app(mock.clone());

    let (status, body) = post_generate(app, json!({ "prompt": "a red apple" })).await;

    assert_eq!(status, StatusCode::OK);
    let urls = body["imageUrls"].as_array().expect("imageUrls array");
    assert_eq!(urls.len(), IMAGES_PER_REQUEST);
    assert_eq!(mock.call_count(), IMAGES_PER_REQUEST);
}

#[tokio::test]
async fn missing_prompt_is_rejected_without_provider_calls() {
    let mock = Arc::new(MockImageProvider::new(true));
    let app = test_app(mock.clone());

    let (status, body) = post_generate(app, json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Prompt is required");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn non_string_prompt_is_rejected() {
    let mock = Arc::new(MockImageProvider::new(true));
    let app = test_app(mock.clone());

    let (status, body) = post_generate(app, json!({ "prompt": 42 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Prompt is required");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn whitespace_prompt_is_rejected() {
    let mock = Arc::new(MockImageProvider::new(true));
    let app = test_app(mock.clone());

    let (status, body) = post_generate(app, json!({ "prompt": "   " })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Prompt is required");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn failed_slot_fails_the_whole_batch() {
    let flaky = Arc::new(FlakyImageProvider {
        fail_call: 2,
        calls: AtomicUsize::new(0),
    });
    let app = test_app(flaky.clone());

    let (status, body) = post_generate(app, json!({ "prompt": "a cat" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("no image"));
    assert!(body.get("imageUrls").is_none());
    // Every slot still ran; there is no short-circuit.
    assert_eq!(flaky.calls.load(Ordering::SeqCst), IMAGES_PER_REQUEST);
}

#[tokio::test]
async fn slot_order_matches_issuing_order_not_completion_order() {
    let provider = Arc::new(ReversedDelayProvider {
        calls: AtomicUsize::new(0),
    });
    let app = test_app(provider);

    let (status, body) = post_generate(app, json!({ "prompt": "ordered" })).await;

    assert_eq!(status, StatusCode::OK);
    let urls: Vec<&str> = body["imageUrls"]
        .as_array()
        .expect("imageUrls array")
        .iter()
        .map(|url| url.as_str().expect("URL string"))
        .collect();
    let expected: Vec<String> = (0..IMAGES_PER_REQUEST)
        .map(|slot| format!("https://images.example.com/slot/{}.png", slot))
        .collect();
    assert_eq!(urls, expected);
}

#[tokio::test]
async fn missing_credential_surfaces_as_server_error() {
    let provider = Arc::new(OpenAiImageProvider::new(OpenAiImageConfig {
        api_key: String::new(),
        model: "dall-e-3".to_string(),
    }));
    let app = test_app(provider);

    let (status, body) = post_generate(app, json!({ "prompt": "a cat" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("not configured"));
}
