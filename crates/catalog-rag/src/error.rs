//! Error types for the catalog RAG pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding or completion provider failed, or returned a malformed payload
    #[error("Provider error: {0}")]
    Provider(String),

    /// A similarity query was issued before the index was created
    #[error("No vector index '{index}' on collection '{collection}' - run reconciliation first")]
    IndexMissing { collection: String, index: String },

    /// One or more staged upserts were rejected by the backend
    #[error("Bulk write failed for {} record(s): {message}", failed_ids.len())]
    BulkWrite {
        failed_ids: Vec<String>,
        message: String,
    },

    /// Collection store error
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid argument supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create an index-missing error
    pub fn index_missing(collection: impl Into<String>, index: impl Into<String>) -> Self {
        Self::IndexMissing {
            collection: collection.into(),
            index: index.into(),
        }
    }

    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
