//! Catalog error types.

use thiserror::Error;

/// Errors that can occur when submitting a mutation batch.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog ingest endpoint rejected the batch.
    #[error("catalog rejected batch ({status}): {message}")]
    Rejected {
        /// HTTP status code returned by the catalog.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Writing the batch to disk failed.
    #[error("catalog file error: {0}")]
    Io(String),

    /// The batch could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
