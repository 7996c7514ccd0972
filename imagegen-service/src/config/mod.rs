use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

/// Which image backend the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Mock,
}

#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    /// Image model (e.g., dall-e-3)
    pub model: String,
    /// Requested image size (e.g., 1024x1024)
    pub size: String,
    /// Requested quality ("standard" or "hd")
    pub quality: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderKind,
    pub openai: OpenAiSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let server = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let provider = match get_env("IMAGEGEN_PROVIDER", Some("openai"), is_prod)?.as_str() {
            "openai" => ProviderKind::OpenAi,
            "mock" => ProviderKind::Mock,
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "IMAGEGEN_PROVIDER must be 'openai' or 'mock', got '{}'",
                    other
                )))
            }
        };

        Ok(AppConfig {
            server,
            provider,
            openai: OpenAiSettings {
                // An empty key is allowed at startup; calls fail with a
                // provider error instead of refusing to boot.
                api_key: get_env("OPENAI_API_KEY", Some(""), is_prod)?,
                model: get_env("OPENAI_IMAGE_MODEL", Some("dall-e-3"), is_prod)?,
                size: get_env("OPENAI_IMAGE_SIZE", Some("1024x1024"), is_prod)?,
                quality: get_env("OPENAI_IMAGE_QUALITY", Some("hd"), is_prod)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
