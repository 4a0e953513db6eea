//! Portal server and OAuth client configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Portal server URL used when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:31080/v1";

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

/// Default per-request HTTP timeout in seconds.
const fn default_request_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PortalConfig {
    /// Portal REST server base URL (e.g., `http://localhost:31080/v1`).
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// OAuth2 client id for the client-credentials grant.
    #[serde(default)]
    pub client_id: String,

    /// OAuth2 client secret.
    #[serde(default)]
    pub client_secret: String,

    /// OAuth2 token endpoint. For Keycloak this is the `token_endpoint`
    /// property of `<keycloak>/realms/<realm>/.well-known/openid-configuration`.
    #[serde(default)]
    pub token_endpoint: String,

    /// Log fetched payloads and token lifecycle steps at `info`.
    #[serde(default)]
    pub debug_logging: bool,

    /// Per-request HTTP timeout, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            client_id: String::new(),
            client_secret: String::new(),
            token_endpoint: String::new(),
            debug_logging: false,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl PortalConfig {
    /// Base URL with trailing slashes removed. Falls back to
    /// [`DEFAULT_SERVER_URL`] when blank.
    #[must_use]
    pub fn server_url(&self) -> String {
        let trimmed = self.server_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            DEFAULT_SERVER_URL.to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Check if the OAuth client has the minimum required fields.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Names of required OAuth fields that are blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.client_id.trim().is_empty() {
            missing.push("client_id");
        }
        if self.client_secret.trim().is_empty() {
            missing.push("client_secret");
        }
        if self.token_endpoint.trim().is_empty() {
            missing.push("token_endpoint");
        }
        missing
    }

    /// Fail with [`ConfigError::NotConfigured`] unless the OAuth client is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] listing the blank fields.
    pub fn require_configured(&self) -> Result<(), ConfigError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            return Ok(());
        }
        Err(ConfigError::NotConfigured {
            section: "portal".to_string(),
            missing: missing.join(", "),
        })
    }

    /// Copy with the client secret masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.client_secret.is_empty() {
            copy.client_secret = "********".to_string();
        }
        copy
    }
}
