//! Error types for the `ragserve-core` crate.

use thiserror::Error;

/// Errors that can occur in the ingestion and query pipelines.
#[derive(Debug, Error)]
pub enum RagError {
    /// A source file could not be opened or decoded as UTF-8.
    #[error("source unreadable ({path}): {message}")]
    SourceUnreadable {
        /// The path of the offending source file.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// An embedding's dimensionality does not match the store's.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimensionality established by the store.
        expected: usize,
        /// The dimensionality of the rejected vector.
        actual: usize,
    },

    /// A nearest-neighbor lookup was attempted against a store with no records.
    #[error("document store is empty")]
    EmptyStore,

    /// A backend could not be reached at all (connection or timeout failure).
    #[error("{backend} backend unavailable: {message}")]
    BackendUnavailable {
        /// The backend that could not be reached.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A backend responded with a non-success status.
    #[error("{backend} backend returned {status}: {message}")]
    BackendError {
        /// The backend that produced the error.
        backend: String,
        /// The HTTP status code of the response.
        status: u16,
        /// Detail extracted from the response body, if any.
        message: String,
    },

    /// A malformed request or argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
