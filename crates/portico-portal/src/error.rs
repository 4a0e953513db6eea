//! Portal error types.

use portico_core::PortalDialect;
use thiserror::Error;

/// Errors that can occur when talking to a portal server.
#[derive(Debug, Error)]
pub enum PortalError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Portal returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the portal.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The portal returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Failed to parse a portal response.
    #[error("parse error: {0}")]
    Parse(String),

    /// A discovery endpoint answered in a shape other than the one probed.
    #[error("{endpoint} answered as {found}, expected {expected}")]
    DialectMismatch {
        endpoint: String,
        expected: PortalDialect,
        found: PortalDialect,
    },

    /// Discovery failed on every probed endpoint. `endpoint` is the last one tried.
    #[error("discovery failed at {endpoint}: {source}")]
    Discovery {
        endpoint: String,
        #[source]
        source: Box<PortalError>,
    },
}
