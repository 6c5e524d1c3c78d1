//! Data types for documents, chunks, and retrieval results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document containing text content and metadata.
///
/// Documents are produced by the convert stage of the ingestion pipeline
/// and are immutable once created. Re-ingesting the same source supersedes
/// the earlier records rather than merging with them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier, derived from the source file name.
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata (at least `source`, the originating path).
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document with a `source` metadata entry.
    pub fn new(id: impl Into<String>, text: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), source.into());
        Self { id: id.into(), text: text.into(), metadata }
    }
}

/// A bounded-length span of a [`Document`] with its vector embedding.
///
/// This is the unit stored in the document store: chunk text plus embedding
/// plus a unique id of the form `{document_id}_{chunk_index}`. An empty
/// `embedding` marks a chunk that has not passed the embed stage yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
    /// Metadata inherited from the parent document plus `chunk_index`.
    pub metadata: HashMap<String, String>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
}

/// A retrieved [`Chunk`] paired with a similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The cosine similarity score (higher is more relevant).
    pub score: f32,
}
