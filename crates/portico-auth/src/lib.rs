//! # portico-auth
//!
//! OAuth2 client-credentials authentication for Portico.
//!
//! Provides the grant request (`TokenClient`), JWT expiry decoding, and the
//! self-renewing [`TokenManager`] that keeps a fresh bearer credential
//! available to the sync pipeline.

pub mod claims;
pub mod credential;
pub mod error;
pub mod grant;
pub mod lifecycle;

pub use credential::Credential;
pub use error::AuthError;
pub use grant::{ClientCredentials, TokenClient};
pub use lifecycle::{RETRY_DELAY, RenewalPlan, TokenManager, plan_renewal};
