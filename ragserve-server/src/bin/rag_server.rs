//! The RAG service binary: upload-and-ingest plus grounded queries.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use ragserve_core::{
    DocumentStore, EmbeddingProvider, Generator, InMemoryStore, IngestionPipeline, OpenAiEmbedder,
    OpenAiGenerator, PipelineConfig, QueryPipeline,
};
use ragserve_server::config::ServerConfig;
use ragserve_server::rag;
use ragserve_server::state::RagState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env(8001);
    let api_key =
        config.api_key.clone().context("OPENAI_API_KEY must be set for the RAG service")?;

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(
        OpenAiEmbedder::new(api_key)?
            .with_base_url(&config.embedding_url)
            .with_model(&config.embedding_model)
            .with_timeout(config.timeout)?,
    );
    let mut generator =
        OpenAiGenerator::new(&config.generation_url, &config.generation_model)?
            .with_timeout(config.timeout)?;
    if let Some(key) = &config.api_key {
        generator = generator.with_api_key(key);
    }
    let generator: Arc<dyn Generator> = Arc::new(generator);

    // One store per process, dimensioned by the embedder; constructed here
    // and handed to both pipelines.
    let store: Arc<dyn DocumentStore> =
        Arc::new(InMemoryStore::with_dimensions(embedder.dimensions()));
    let pipeline_config = PipelineConfig::builder().mode(config.mode).build()?;

    let ingest = Arc::new(
        IngestionPipeline::builder()
            .embedding_provider(embedder.clone())
            .store(store.clone())
            .config(pipeline_config.clone())
            .build()?,
    );
    let query = Arc::new(
        QueryPipeline::builder()
            .embedding_provider(embedder)
            .store(store.clone())
            .generator(generator)
            .config(pipeline_config)
            .build()?,
    );

    // Seed the store from a fixed remote source when one is configured.
    if let Some(url) = &config.source_url {
        let report = ingest
            .ingest_url(url)
            .await
            .with_context(|| format!("failed to ingest source url {url}"))?;
        info!(url, chunks = report.chunks, "seeded store from remote source");
    }

    let state = RagState { ingest, query, uploads_dir: config.uploads_dir.clone() };
    let app = rag::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("RAG service listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
