use axum::{extract::State, Json};
use serde_json::Value;
use std::time::Instant;

use crate::error::AppError;
use crate::models::GenerateImagesResponse;
use crate::services::generation::IMAGES_PER_REQUEST;
use crate::services::metrics;
use crate::startup::AppState;

/// `POST /api/images/generate`.
///
/// Accepts `{ "prompt": <string> }` and responds with `{ "imageUrls": [...] }`
/// holding exactly one URL per slot. Partial results are never returned; any
/// failed slot fails the request.
pub async fn generate_images(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<GenerateImagesResponse>, AppError> {
    let prompt = match body.get("prompt").and_then(Value::as_str) {
        Some(p) if !p.trim().is_empty() => p,
        _ => {
            tracing::warn!("Rejected generation request with missing or empty prompt");
            metrics::record_generation("bad_request");
            return Err(AppError::BadRequest(anyhow::anyhow!("Prompt is required")));
        }
    };

    tracing::info!(
        prompt_len = prompt.len(),
        slots = IMAGES_PER_REQUEST,
        "Generating image set"
    );

    let started = Instant::now();
    match state.generator.generate_set(prompt).await {
        Ok(image_urls) => {
            metrics::record_generation("ok");
            metrics::observe_generation_seconds("ok", started.elapsed().as_secs_f64());
            Ok(Json(GenerateImagesResponse { image_urls }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Image set generation failed");
            metrics::record_generation("error");
            metrics::observe_generation_seconds("error", started.elapsed().as_secs_f64());
            Err(AppError::Generation(e))
        }
    }
}
