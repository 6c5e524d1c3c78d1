//! Ingestion pipeline: convert → clean → split → embed → write.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::clean::clean_text;
use crate::config::PipelineConfig;
use crate::document::Document;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::store::DocumentStore;

/// What an ingestion run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of documents converted.
    pub documents: usize,
    /// Number of records written to the store.
    pub chunks: usize,
}

/// The five-stage ingestion pipeline.
///
/// Each invocation runs convert → clean → split → embed → write strictly in
/// sequence, each stage consuming the prior stage's full output. Failure of
/// any stage aborts the remaining stages; records written by earlier
/// invocations are not rolled back, so ingestion is at-least-once, not
/// atomic. Construct one via [`IngestionPipeline::builder()`].
pub struct IngestionPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn DocumentStore>,
    chunker: Arc<dyn Chunker>,
}

impl IngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    /// Ingest one or more UTF-8 text files.
    ///
    /// The whole batch aborts on the first file that cannot be read or
    /// decoded ([`RagError::SourceUnreadable`]); documents converted before
    /// the failure are not written.
    pub async fn ingest_paths(&self, paths: &[PathBuf]) -> Result<IngestReport> {
        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            documents.push(convert(path).await?);
        }
        self.run(documents).await
    }

    /// Ingest pre-loaded text under the given document id.
    pub async fn ingest_text(&self, id: &str, text: &str) -> Result<IngestReport> {
        let document = Document::new(id, text, id);
        self.run(vec![document]).await
    }

    /// Download a remote UTF-8 text source and ingest it.
    ///
    /// The document id is derived from the URL's last path segment, so
    /// re-ingesting the same URL overwrites its earlier records. A source
    /// that cannot be fetched (connection failure, timeout, or non-success
    /// status) fails with [`RagError::SourceUnreadable`] before anything is
    /// written.
    pub async fn ingest_url(&self, url: &str) -> Result<IngestReport> {
        let client = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| RagError::Config(format!("failed to build HTTP client: {e}")))?;

        let response = client.get(url).send().await.map_err(|e| {
            error!(url, error = %e, "source download failed");
            RagError::SourceUnreadable { path: url.to_string(), message: e.to_string() }
        })?;
        if !response.status().is_success() {
            error!(url, status = %response.status(), "source download rejected");
            return Err(RagError::SourceUnreadable {
                path: url.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }
        let text = response.text().await.map_err(|e| RagError::SourceUnreadable {
            path: url.to_string(),
            message: format!("failed to read body: {e}"),
        })?;

        let id = document_id_from_url(url);
        info!(url, document.id = %id, "downloaded remote source");
        self.run(vec![Document::new(id, text, url)]).await
    }

    async fn run(&self, documents: Vec<Document>) -> Result<IngestReport> {
        let document_count = documents.len();

        // Clean, then split, keeping document order.
        let mut chunks = Vec::new();
        for mut document in documents {
            document.text = clean_text(&document.text);
            chunks.extend(self.chunker.chunk(&document));
        }

        if chunks.is_empty() {
            info!(documents = document_count, chunks = 0, "ingestion produced no chunks");
            return Ok(IngestReport { documents: document_count, chunks: 0 });
        }

        // Embed in one batch; output order matches input order, so the
        // embeddings attach positionally.
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.inspect_err(|e| {
            error!(error = %e, "embedding failed during ingestion");
        })?;
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        self.store.insert(&chunks).await.inspect_err(|e| {
            error!(error = %e, "store insert failed during ingestion");
        })?;

        let chunk_count = chunks.len();
        info!(documents = document_count, chunks = chunk_count, "ingestion complete");
        Ok(IngestReport { documents: document_count, chunks: chunk_count })
    }
}

/// Timeout for downloading a remote source.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Derive a document id from a URL's last path segment, extension stripped.
fn document_id_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .map(|segment| segment.split('?').next().unwrap_or(segment))
        .map(|segment| segment.strip_suffix(".txt").unwrap_or(segment))
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(str::to_string)
        .unwrap_or_else(|| "remote".to_string())
}

/// Read one source file into a [`Document`] with `source` metadata.
async fn convert(path: &Path) -> Result<Document> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| RagError::SourceUnreadable {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let id = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Document::new(id, text, path.display().to_string()))
}


/// Builder for constructing an [`IngestionPipeline`].
///
/// `embedding_provider` and `store` are required; the chunker defaults to a
/// [`FixedSizeChunker`] derived from the config's `chunk_size`/`chunk_overlap`.
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn DocumentStore>>,
    chunker: Option<Arc<dyn Chunker>>,
    config: Option<PipelineConfig>,
}

impl IngestionPipelineBuilder {
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

    /// Override the default chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the [`IngestionPipeline`], validating required fields.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the embedding provider or store is missing.
    pub fn build(self) -> Result<IngestionPipeline> {
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let store = self.store.ok_or_else(|| RagError::Config("store is required".to_string()))?;
        let config = self.config.unwrap_or_default();
        let chunker = self
            .chunker
            .unwrap_or_else(|| Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)));
        Ok(IngestionPipeline { embedder, store, chunker })
    }
}
