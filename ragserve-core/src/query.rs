//! Query pipeline: embed → retrieve → render prompt → generate.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::{PipelineConfig, QueryMode};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::{ChatMessage, GenerationParams, Generator};
use crate::prompt::{join_context, render_prompt};
use crate::store::DocumentStore;

/// The query-time half of the pipeline.
///
/// Embeds the incoming query with the same provider used at ingestion,
/// retrieves the `top_k` nearest records, and either returns the retrieved
/// context directly ([`QueryMode::ContextOnly`]) or renders the grounding
/// prompt and returns the generated answer ([`QueryMode::Generate`]).
/// Any stage failure surfaces as a single error; no partial results.
pub struct QueryPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn DocumentStore>,
    generator: Option<Arc<dyn Generator>>,
    params: GenerationParams,
    config: PipelineConfig,
}

impl QueryPipeline {
    /// Create a new [`QueryPipelineBuilder`].
    pub fn builder() -> QueryPipelineBuilder {
        QueryPipelineBuilder::default()
    }

    /// Answer a query against the store's current contents.
    pub async fn run(&self, query: &str) -> Result<String> {
        if query.trim().is_empty() {
            return Err(RagError::Validation("query must not be empty".to_string()));
        }

        let query_embedding = self.embedder.embed(query).await.inspect_err(|e| {
            error!(error = %e, "query embedding failed");
        })?;

        let results = self.store.nearest(&query_embedding, self.config.top_k).await.inspect_err(
            |e| {
                error!(error = %e, "retrieval failed");
            },
        )?;

        let output = match self.config.mode {
            QueryMode::ContextOnly => join_context(&results),
            QueryMode::Generate => {
                let generator = self.generator.as_ref().ok_or_else(|| {
                    RagError::Config("generate mode requires a generator".to_string())
                })?;
                let prompt = render_prompt(query, &results);
                let reply = generator
                    .chat(&[ChatMessage::user(prompt)], &self.params)
                    .await
                    .inspect_err(|e| error!(error = %e, "generation failed"))?;
                reply.trim().to_string()
            }
        };

        info!(retrieved = results.len(), mode = ?self.config.mode, "query complete");
        Ok(output)
    }
}

/// Builder for constructing a [`QueryPipeline`].
///
/// The embedding provider and store are required; the generator only when
/// the config's mode is [`QueryMode::Generate`].
#[derive(Default)]
pub struct QueryPipelineBuilder {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn DocumentStore>>,
    generator: Option<Arc<dyn Generator>>,
    params: Option<GenerationParams>,
    config: Option<PipelineConfig>,
}

impl QueryPipelineBuilder {
    /// Set the embedding provider.
    pub fn embedding_provider(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the document store.
    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the generation backend.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Override the default sampling parameters used in generate mode.
    pub fn params(mut self, params: GenerationParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the [`QueryPipeline`], validating required fields.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the embedding provider or store is
    /// missing, or if the mode is [`QueryMode::Generate`] and no generator
    /// was provided.
    pub fn build(self) -> Result<QueryPipeline> {
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let store = self.store.ok_or_else(|| RagError::Config("store is required".to_string()))?;
        let config = self.config.unwrap_or_default();
        if config.mode == QueryMode::Generate && self.generator.is_none() {
            return Err(RagError::Config("generate mode requires a generator".to_string()));
        }
        Ok(QueryPipeline {
            embedder,
            store,
            generator: self.generator,
            params: self.params.unwrap_or_default(),
            config,
        })
    }
}
