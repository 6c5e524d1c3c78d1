//! Shared per-service state, injected into handlers.
//!
//! Pipelines and the document store are constructed once at process start
//! and shared by handle; the store's lock serializes concurrent writes.

use std::path::PathBuf;
use std::sync::Arc;

use ragserve_core::{GenerationParams, Generator, IngestionPipeline, QueryPipeline};

/// State for the RAG service (`/api/rag_chat`, `/api/upload`).
///
/// Both pipelines hold handles to the same document store.
#[derive(Clone)]
pub struct RagState {
    /// The ingestion pipeline fed by uploads.
    pub ingest: Arc<IngestionPipeline>,
    /// The query pipeline backing `/api/rag_chat`.
    pub query: Arc<QueryPipeline>,
    /// Where uploaded files are persisted before ingestion.
    pub uploads_dir: PathBuf,
}

/// State for the chat passthrough service (`/api/chat`).
#[derive(Clone)]
pub struct ChatState {
    /// The completion backend.
    pub generator: Arc<dyn Generator>,
    /// Fixed sampling parameters for passthrough completions.
    pub params: GenerationParams,
}
