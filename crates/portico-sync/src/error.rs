//! Sync error types.

use portico_catalog::CatalogError;
use portico_core::CoreError;
use thiserror::Error;

/// Errors that escape a sync cycle. Fetch failures never do; they are
/// logged and the cycle publishes what it has.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The built batch broke an ownership invariant.
    #[error("invalid catalog batch: {0}")]
    InvalidBatch(#[from] CoreError),

    /// The catalog did not accept the batch.
    #[error("catalog submission failed: {0}")]
    Catalog(#[from] CatalogError),
}
