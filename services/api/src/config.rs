//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// Where the relay sends completions unless `CHAT_API_URL` says otherwise.
pub const DEFAULT_CHAT_API_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub data_dir: PathBuf,
    pub log_level: Level,
    /// Optional JSON catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
    pub chat_api_url: String,
    /// Server-held credential for the upstream; never sent to callers.
    pub chat_api_key: Option<String>,
    pub chat_model: String,
    pub chat_timeout: Duration,
    /// How long guests may preview a resource.
    pub preview_duration: Duration,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Storage Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let catalog_path = std::env::var("CATALOG_PATH").ok().map(PathBuf::from);

        // --- Load Upstream Chat Settings ---
        let chat_api_url =
            std::env::var("CHAT_API_URL").unwrap_or_else(|_| DEFAULT_CHAT_API_URL.to_string());
        let chat_api_key = std::env::var("CHAT_API_KEY").ok().filter(|k| !k.is_empty());
        let chat_model = std::env::var("CHAT_MODEL")
            .unwrap_or_else(|_| "google/gemini-3-flash-preview".to_string());

        let timeout_str = std::env::var("CHAT_TIMEOUT_SECS").unwrap_or_else(|_| "60".to_string());
        let chat_timeout = timeout_str
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "CHAT_TIMEOUT_SECS".to_string(),
                    format!("'{}' is not a positive number of seconds", timeout_str),
                )
            })?;

        let preview_str = std::env::var("PREVIEW_SECONDS").unwrap_or_else(|_| "10".to_string());
        let preview_duration = preview_str
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidValue("PREVIEW_SECONDS".to_string(), e.to_string()))?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        Ok(Self {
            bind_address,
            data_dir,
            log_level,
            catalog_path,
            chat_api_url,
            chat_api_key,
            chat_model,
            chat_timeout,
            preview_duration,
            cors_origin,
        })
    }
}
