//! Embedding provider trait for mapping text to fixed-length vectors.

use async_trait::async_trait;

use crate::error::Result;

/// A backend that maps text to fixed-dimensionality numeric vectors.
///
/// The same provider (or at least the same model) must be used at
/// ingestion time and query time; the document store enforces the
/// dimensionality contract on insert and lookup.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts. Output order matches input order.
    ///
    /// The default implementation embeds sequentially; backends with a
    /// native batch endpoint should override it.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The dimensionality of vectors produced by this provider.
    fn dimensions(&self) -> usize;
}
