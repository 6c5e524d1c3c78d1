//! In-memory document store using cosine similarity.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::store::DocumentStore;

#[derive(Debug, Default)]
struct Inner {
    dimensions: Option<usize>,
    records: HashMap<String, Chunk>,
}

/// An in-memory [`DocumentStore`] backed by a `HashMap` behind a
/// `tokio::sync::RwLock`.
///
/// Records are keyed by chunk id, so re-inserting a chunk with an existing
/// id overwrites the earlier record while distinct ids accumulate. The
/// store's dimensionality is either fixed at construction or established by
/// the first insert; every later vector must match it.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    /// Create an empty store whose dimensionality is set by the first insert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with a fixed dimensionality.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { inner: RwLock::new(Inner { dimensions: Some(dimensions), records: HashMap::new() }) }
    }
}

/// Cosine similarity of two vectors; 0.0 if either has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert(&self, chunks: &[Chunk]) -> Result<()> {
        let mut inner = self.inner.write().await;

        // Validate the whole batch before touching the map, so a rejected
        // batch leaves the store unchanged.
        let mut dimensions = inner.dimensions;
        for chunk in chunks {
            if chunk.embedding.is_empty() {
                return Err(RagError::Validation(format!(
                    "chunk '{}' has no embedding attached",
                    chunk.id
                )));
            }
            match dimensions {
                Some(expected) if chunk.embedding.len() != expected => {
                    return Err(RagError::DimensionMismatch {
                        expected,
                        actual: chunk.embedding.len(),
                    });
                }
                Some(_) => {}
                None => dimensions = Some(chunk.embedding.len()),
            }
        }

        inner.dimensions = dimensions;
        for chunk in chunks {
            inner.records.insert(chunk.id.clone(), chunk.clone());
        }
        Ok(())
    }

    async fn nearest(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        let inner = self.inner.read().await;
        if inner.records.is_empty() {
            return Err(RagError::EmptyStore);
        }
        if let Some(expected) = inner.dimensions {
            if embedding.len() != expected {
                return Err(RagError::DimensionMismatch { expected, actual: embedding.len() });
            }
        }

        let mut scored: Vec<SearchResult> = inner
            .records
            .values()
            .map(|chunk| SearchResult {
                score: cosine_similarity(&chunk.embedding, embedding),
                chunk: chunk.clone(),
            })
            .collect();

        // Descending score, ties broken by id so results are deterministic
        // for a fixed store and query.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.id.cmp(&b.chunk.id))
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn count(&self) -> usize {
        self.inner.read().await.records.len()
    }
}
