//! Cross-cutting error types for Portico.
//!
//! Domain-specific errors (`AuthError`, `PortalError`, `CatalogError`) live in
//! their respective crates and converge into `anyhow` in `portico-cli`.

use thiserror::Error;

/// Errors that can be raised by any Portico crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Data failed validation (shape, format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),
}
