//! # portico-portal
//!
//! Portal server HTTP client for Portico.
//!
//! Discovers the APIs a portal server exposes and normalizes them into
//! [`ApiVersionRecord`]s, whichever of the two response dialects the server
//! speaks:
//! - grouped-by-product (`GET /apis?includeSchema=true`), with a per-API
//!   schema fetch for servers that do not inline schemas
//! - flat product summaries (`GET /api-products`), with a per-product
//!   versions fetch
//!
//! The dialect is sniffed from the response itself and remembered in a
//! [`DialectSlot`] between cycles.

pub mod detect;
mod error;
mod grouped;
mod http;
mod normalize;
mod summaries;

pub use detect::classify;
pub use error::PortalError;
pub use normalize::{DialectSlot, Normalized};

use std::time::Duration;

use portico_core::ApiVersionRecord;

/// HTTP client for one portal server.
#[derive(Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    debug_logging: bool,
}

impl PortalClient {
    /// Create a client for `base_url` (trailing slashes are removed).
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Http`] if the underlying `reqwest::Client`
    /// fails to build.
    pub fn new(base_url: &str, timeout: Duration, debug_logging: bool) -> Result<Self, PortalError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("portico/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self::with_http(http, base_url, debug_logging))
    }

    /// Create a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http(http: reqwest::Client, base_url: &str, debug_logging: bool) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            debug_logging,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bearer-authenticated GET returning the JSON body.
    async fn get_json(
        http: &reqwest::Client,
        url: &str,
        auth_header: &str,
    ) -> Result<serde_json::Value, PortalError> {
        let resp = http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, auth_header)
            .send()
            .await?;
        http::read_json(resp).await
    }

    fn log_payload(&self, what: &str, url: &str, payload: &serde_json::Value) {
        if self.debug_logging {
            tracing::info!(url, %payload, "fetched {what}");
        } else {
            tracing::debug!(url, "fetched {what}");
        }
    }

    fn log_records(&self, records: &[ApiVersionRecord]) {
        if self.debug_logging {
            let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
            tracing::info!(count = records.len(), ?ids, "normalized API versions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_trimmed() {
        let client = PortalClient::with_http(reqwest::Client::new(), "http://portal/v1//", false);
        assert_eq!(client.base_url(), "http://portal/v1");
    }

    #[test]
    fn builds_with_timeout() {
        let client = PortalClient::new("http://portal/v1", Duration::from_secs(5), true).unwrap();
        assert_eq!(client.base_url(), "http://portal/v1");
    }
}
