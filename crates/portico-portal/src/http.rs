//! Status handling shared by every portal request.
//!
//! A 429 becomes [`PortalError::RateLimited`]; any other non-2xx becomes
//! [`PortalError::Api`] carrying the body. Bodies are parsed as JSON only
//! after the status passed.

use crate::error::PortalError;

/// Seconds to wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Pass a successful response through, or map its status to an error.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, PortalError> {
    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(PortalError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !resp.status().is_success() {
        return Err(PortalError::Api {
            status: resp.status().as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

/// Read a checked response body as JSON.
pub async fn read_json(resp: reqwest::Response) -> Result<serde_json::Value, PortalError> {
    let body = check_response(resp).await?.text().await?;
    serde_json::from_str(&body).map_err(|e| PortalError::Parse(e.to_string()))
}

fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
