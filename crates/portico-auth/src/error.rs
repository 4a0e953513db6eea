use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP transport error talking to the token endpoint.
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint answered with a non-success status and no
    /// parseable OAuth error body.
    #[error("token endpoint error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The grant was rejected or the response was malformed. The message is
    /// taken from `error_description`/`error` when the server sent them.
    #[error("{0}")]
    Grant(String),

    /// The granted token was already expired on arrival.
    #[error("access token is expired")]
    TokenExpired,

    /// The token could not be decoded to read its expiry.
    #[error("token decode failed: {0}")]
    Decode(String),
}
