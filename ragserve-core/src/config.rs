//! Configuration for the ingestion and query pipelines.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// What the query pipeline returns to the caller.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Return the retrieved chunks joined as a context block, without
    /// calling the generation backend. The default.
    #[default]
    ContextOnly,
    /// Render the grounding prompt and return the generated answer.
    Generate,
}

/// Tunable parameters shared by the ingestion and query pipelines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Characters repeated between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of records retrieved per query.
    pub top_k: usize,
    /// Whether queries return raw context or a generated answer.
    pub mode: QueryMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { chunk_size: 512, chunk_overlap: 0, top_k: 3, mode: QueryMode::default() }
    }
}

impl PipelineConfig {
    /// Create a new builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for a validated [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of records retrieved per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the query mode.
    pub fn mode(mut self, mode: QueryMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Build the config, validating that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `chunk_size == 0`, `top_k == 0`, or
    /// `chunk_overlap >= chunk_size`.
    pub fn build(self) -> Result<PipelineConfig> {
        if self.config.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
