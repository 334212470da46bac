//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{load_catalog, FileStore, UpstreamChatAdapter},
    config::Config,
    error::ApiError,
    web::{create_router, state::AppState},
};
use campus_vault_core::ports::{ChatCompletionService, KeyValueStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open Storage & Load the Catalog ---
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.data_dir).await?);
    info!("Data directory: {}", config.data_dir.display());
    let catalog = load_catalog(config.catalog_path.as_deref()).await?;

    // --- 3. Initialize the Upstream Chat Adapter ---
    let upstream: Option<Arc<dyn ChatCompletionService>> = match &config.chat_api_key {
        Some(key) => Some(Arc::new(UpstreamChatAdapter::new(
            config.chat_api_url.clone(),
            key.clone(),
            config.chat_model.clone(),
            config.chat_timeout,
        )?)),
        None => {
            warn!("CHAT_API_KEY is not set; /chat will answer with an error.");
            None
        }
    };

    // --- 4. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(config.clone(), catalog, store, upstream));
    let app = create_router(app_state)?;

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
