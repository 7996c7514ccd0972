//! Application startup and router assembly.
//!
//! Binds the listener (port 0 yields a random port for testing), wires the
//! configured provider into the generator, and runs the server until a
//! shutdown signal arrives.

use crate::config::{AppConfig, ProviderKind};
use crate::error::AppError;
use crate::handlers::app::{health_check, index, metrics, readiness_check};
use crate::handlers::images::generate_images;
use crate::services::generation::ImageGenerator;
use crate::services::providers::mock::MockImageProvider;
use crate::services::providers::openai::{OpenAiImageConfig, OpenAiImageProvider};
use crate::services::providers::{ImageParams, ImageProvider};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub generator: ImageGenerator,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .route("/api/images/generate", post(generate_images))
        .nest_service("/static", ServeDir::new(static_dir()))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}

/// Static assets live next to the crate; resolve them whether the process
/// runs from the workspace root or the crate directory.
fn static_dir() -> PathBuf {
    let base = std::env::current_dir().expect("Failed to determine the current directory");
    if base.ends_with("imagegen-service") {
        base.join("static")
    } else {
        base.join("imagegen-service").join("static")
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: AppConfig) -> Result<Self, AppError> {
        crate::services::metrics::init_metrics();

        let provider: Arc<dyn ImageProvider> = match config.provider {
            ProviderKind::OpenAi => Arc::new(OpenAiImageProvider::new(OpenAiImageConfig {
                api_key: config.openai.api_key.clone(),
                model: config.openai.model.clone(),
            })),
            ProviderKind::Mock => Arc::new(MockImageProvider::new(true)),
        };

        tracing::info!(
            provider = ?config.provider,
            model = %config.openai.model,
            "Initialized image provider"
        );

        let params = ImageParams {
            size: config.openai.size.clone(),
            quality: config.openai.quality.clone(),
        };
        let generator = ImageGenerator::new(provider, params);

        let state = AppState {
            config: config.clone(),
            generator,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("imagegen-service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
