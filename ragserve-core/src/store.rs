//! Document store trait: insertion and nearest-neighbor lookup.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// An in-process index of embedded chunks supporting vector similarity lookup.
///
/// Stores live for the process lifetime only; there is no durability.
/// Implementations must allow concurrent reads and serialize writes so the
/// identifier space cannot be corrupted by parallel requests.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert chunks (each with its embedding attached) as records.
    ///
    /// Every embedding must match the store's established dimensionality;
    /// a mismatch fails with [`RagError::DimensionMismatch`] and inserts
    /// nothing from the batch.
    ///
    /// [`RagError::DimensionMismatch`]: crate::error::RagError::DimensionMismatch
    async fn insert(&self, chunks: &[Chunk]) -> Result<()>;

    /// Return up to `top_k` records most similar to `embedding`, ordered by
    /// descending similarity.
    ///
    /// Fails with [`RagError::EmptyStore`] when no records exist.
    ///
    /// [`RagError::EmptyStore`]: crate::error::RagError::EmptyStore
    async fn nearest(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>>;

    /// The number of stored records.
    async fn count(&self) -> usize;
}
