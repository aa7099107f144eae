use std::sync::Arc;

use dotenvy::dotenv;
use tracing::info;

mod config;
mod error;
mod handlers;
mod llm;
mod media;
mod prompt;
mod session;
mod state;
mod styles;
mod utils;

use config::CONFIG;
use llm::GeminiClient;
use state::AppState;
use utils::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let _guards = init_logging();

    let backend = Arc::new(GeminiClient::from_config(&CONFIG));
    let state = AppState::new(backend, CONFIG.max_upload_bytes);
    let app = handlers::router(state);

    let addr = format!("{}:{}", CONFIG.host, CONFIG.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "Headshot studio listening on http://{addr} (model: {})",
        CONFIG.gemini_image_model
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for the shutdown signal: {err}");
        return;
    }
    info!("Shutdown signal received");
}
