//! OAuth2 client-credentials grant.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::claims::decode_expiry;
use crate::credential::Credential;
use crate::error::AuthError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// Client identity used for the grant.
#[derive(Clone)]
pub struct ClientCredentials {
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Raw token endpoint response. Success and error shapes share one struct.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenResponse {
    /// Parse a response body, surfacing OAuth error fields as [`AuthError::Grant`].
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Grant`] when the body is not JSON, carries
    /// `error_description`/`error`, or has no `access_token`.
    pub fn parse(body: &str) -> Result<Self, AuthError> {
        let response: Self = serde_json::from_str(body)
            .map_err(|_| AuthError::Grant("Error parsing oauth response.".into()))?;
        if let Some(description) = response.error_description.as_deref().filter(|s| !s.is_empty()) {
            return Err(AuthError::Grant(description.to_string()));
        }
        if let Some(error) = response.error.as_deref().filter(|s| !s.is_empty()) {
            return Err(AuthError::Grant(error.to_string()));
        }
        if response.access_token.as_deref().is_none_or(str::is_empty) {
            return Err(AuthError::Grant(
                "No 'access_token' property was found in the oauth response body.".into(),
            ));
        }
        Ok(response)
    }

    /// Turn a validated response into a [`Credential`].
    ///
    /// Expiry comes from the JWT `exp` claim, then from `expires_in`
    /// relative to `now`. When neither is available the credential is
    /// untracked.
    #[must_use]
    pub fn into_credential(self, now: DateTime<Utc>) -> Credential {
        let access_token = self.access_token.unwrap_or_default();
        let expires_at = match decode_expiry(&access_token) {
            Ok(at) => Some(at),
            Err(error) => {
                tracing::warn!(%error, "no `exp` claim readable from the access token");
                self.expires_in
                    .and_then(chrono::TimeDelta::try_seconds)
                    .map(|delta| now + delta)
            }
        };
        Credential {
            access_token,
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
            expires_at,
        }
    }
}

/// HTTP client for the token endpoint.
pub struct TokenClient {
    http: reqwest::Client,
    credentials: ClientCredentials,
}

impl TokenClient {
    #[must_use]
    pub const fn new(http: reqwest::Client, credentials: ClientCredentials) -> Self {
        Self { http, credentials }
    }

    #[must_use]
    pub fn token_endpoint(&self) -> &str {
        &self.credentials.token_endpoint
    }

    /// URL-form-encoded grant body.
    #[must_use]
    pub fn form_body(&self) -> String {
        [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
        ]
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
    }

    /// Perform the client-credentials grant.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Http`] on transport failure, [`AuthError::Api`]
    /// for a non-success status without an OAuth error body, and
    /// [`AuthError::Grant`] for rejected or malformed responses.
    pub async fn request_token(&self) -> Result<Credential, AuthError> {
        let resp = self
            .http
            .post(&self.credentials.token_endpoint)
            .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(self.form_body())
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        let parsed = TokenResponse::parse(&body);
        if !status.is_success()
            && let Err(AuthError::Grant(message)) = &parsed
            && message == "Error parsing oauth response."
        {
            return Err(AuthError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(parsed?.into_credential(Utc::now()))
    }
}
