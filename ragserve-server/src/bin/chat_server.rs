//! The chat passthrough binary.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use ragserve_core::{GenerationParams, Generator, OpenAiGenerator};
use ragserve_server::chat;
use ragserve_server::config::ServerConfig;
use ragserve_server::state::ChatState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env(8002);
    let mut generator =
        OpenAiGenerator::new(&config.generation_url, &config.generation_model)?
            .with_timeout(config.timeout)?;
    if let Some(key) = &config.api_key {
        generator = generator.with_api_key(key);
    }
    let generator: Arc<dyn Generator> = Arc::new(generator);

    // Fixed sampling parameters for the passthrough: bounded output,
    // moderate randomness.
    let state = ChatState { generator, params: GenerationParams::new(100, 0.5) };
    let app = chat::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("chat passthrough listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
