//! Retrieval-augmented prompt assembly.
//!
//! This crate implements the full document-to-answer data flow behind the
//! `ragserve` HTTP services:
//!
//! - **Ingestion** ([`IngestionPipeline`]): convert source files to
//!   documents, clean and split them, embed every chunk, and write the
//!   records into a [`DocumentStore`].
//! - **Query** ([`QueryPipeline`]): embed a natural-language query, retrieve
//!   the top-K nearest chunks, and either return the retrieved context or a
//!   generated answer grounded in it.
//! - **Backends**: an [`EmbeddingProvider`] and a [`Generator`] speaking the
//!   OpenAI wire protocol, usable against hosted or local servers.
//!
//! The only store implementation is [`InMemoryStore`]; records live for the
//! process lifetime.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragserve_core::{IngestionPipeline, InMemoryStore, PipelineConfig, QueryPipeline};
//!
//! let store = Arc::new(InMemoryStore::new());
//! let ingest = IngestionPipeline::builder()
//!     .embedding_provider(embedder.clone())
//!     .store(store.clone())
//!     .build()?;
//! ingest.ingest_paths(&[path]).await?;
//!
//! let query = QueryPipeline::builder()
//!     .embedding_provider(embedder)
//!     .store(store)
//!     .build()?;
//! let context = query.run("What color is the sky?").await?;
//! ```

pub mod chunking;
pub mod clean;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod inmemory;
pub mod openai;
pub mod prompt;
pub mod query;
pub mod store;

pub use chunking::{Chunker, FixedSizeChunker};
pub use clean::clean_text;
pub use config::{PipelineConfig, PipelineConfigBuilder, QueryMode};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::{ChatMessage, GenerationParams, Generator, OpenAiGenerator};
pub use ingest::{IngestReport, IngestionPipeline, IngestionPipelineBuilder};
pub use inmemory::InMemoryStore;
pub use openai::OpenAiEmbedder;
pub use prompt::{join_context, render_prompt, render_transcript};
pub use query::{QueryPipeline, QueryPipelineBuilder};
pub use store::DocumentStore;
