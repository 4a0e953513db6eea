//! Self-renewing token lifecycle.
//!
//! [`TokenManager`] owns one background task that acquires a credential,
//! sleeps until shortly before it expires, and acquires again. Failed grants
//! are retried every [`RETRY_DELAY`] until one succeeds. The current
//! credential is published through a `watch` channel so readers always see
//! a whole credential, never a half-updated one.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::credential::Credential;
use crate::error::AuthError;
use crate::grant::TokenClient;

/// Renew this long before the token expires.
pub const RENEW_MARGIN: Duration = Duration::from_secs(5);

/// Never hit the token endpoint more than once per this interval.
pub const MIN_RENEW_INTERVAL: Duration = Duration::from_secs(1);

/// Wait this long after a failed grant before trying again.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// What to do after a credential was acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalPlan {
    /// Acquire again after this delay.
    Renew { after: Duration },
    /// The credential is already expired; discard it.
    Expired,
    /// Expiry unknown; keep the credential and stop renewing.
    Untracked,
}

/// Decide when to renew a credential expiring at `expires_at`.
///
/// Renewal happens [`RENEW_MARGIN`] early but never sooner than
/// [`MIN_RENEW_INTERVAL`] from `now`.
#[must_use]
pub fn plan_renewal(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> RenewalPlan {
    let Some(expires_at) = expires_at else {
        return RenewalPlan::Untracked;
    };
    let Ok(until_expiry) = (expires_at - now).to_std() else {
        return RenewalPlan::Expired;
    };
    if until_expiry.is_zero() {
        return RenewalPlan::Expired;
    }
    RenewalPlan::Renew {
        after: until_expiry
            .saturating_sub(RENEW_MARGIN)
            .max(MIN_RENEW_INTERVAL),
    }
}

/// Delay before the next acquisition attempt, or `None` to stop renewing.
#[must_use]
pub fn next_attempt_delay(
    outcome: &Result<Arc<Credential>, AuthError>,
    now: DateTime<Utc>,
) -> Option<Duration> {
    match outcome {
        Err(_) => Some(RETRY_DELAY),
        Ok(credential) => match plan_renewal(credential.expires_at, now) {
            RenewalPlan::Renew { after } => Some(after),
            RenewalPlan::Expired => Some(RETRY_DELAY),
            RenewalPlan::Untracked => None,
        },
    }
}

struct Shared {
    client: TokenClient,
    current: watch::Sender<Option<Arc<Credential>>>,
    debug_logging: bool,
}

impl Shared {
    fn step(&self, message: &str) {
        if self.debug_logging {
            tracing::info!(token_endpoint = self.client.token_endpoint(), "{message}");
        } else {
            tracing::debug!(token_endpoint = self.client.token_endpoint(), "{message}");
        }
    }

    async fn acquire(&self) -> Result<Arc<Credential>, AuthError> {
        self.step("requesting access token");
        let credential = self.client.request_token().await?;
        match plan_renewal(credential.expires_at, Utc::now()) {
            RenewalPlan::Expired => {
                tracing::warn!("access token is expired on arrival; discarding it");
                self.current.send_replace(None);
                Err(AuthError::TokenExpired)
            }
            plan => {
                if plan == RenewalPlan::Untracked {
                    tracing::warn!("access token expiry unknown; it will not be renewed");
                }
                let credential = Arc::new(credential);
                self.current.send_replace(Some(Arc::clone(&credential)));
                self.step("got access token");
                Ok(credential)
            }
        }
    }

    async fn renewal_loop(self: Arc<Self>) {
        loop {
            let outcome = self.acquire().await;
            if let Err(error) = &outcome {
                tracing::warn!(%error, retry_in_secs = RETRY_DELAY.as_secs(), "access token request failed");
            }
            let Some(delay) = next_attempt_delay(&outcome, Utc::now()) else {
                return;
            };
            if outcome.is_ok() {
                self.step("scheduled access token renewal");
            }
            tokio::time::sleep(delay).await;
        }
    }
}

/// Acquires and autonomously renews a bearer credential.
///
/// Each manager owns its own pending renewal task; dropping the manager
/// cancels it.
pub struct TokenManager {
    shared: Arc<Shared>,
    updates: watch::Receiver<Option<Arc<Credential>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TokenManager {
    #[must_use]
    pub fn new(client: TokenClient, debug_logging: bool) -> Self {
        let (current, updates) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                client,
                current,
                debug_logging,
            }),
            updates,
            task: Mutex::new(None),
        }
    }

    /// Perform one grant and publish the result.
    ///
    /// Does not schedule renewals; use [`Self::start`] for that.
    ///
    /// # Errors
    ///
    /// Returns the grant error, or [`AuthError::TokenExpired`] if the token
    /// was already expired on arrival.
    pub async fn acquire(&self) -> Result<Arc<Credential>, AuthError> {
        self.shared.acquire().await
    }

    /// Start the self-rescheduling renewal task. No-op if already running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        *task = Some(tokio::spawn(Arc::clone(&self.shared).renewal_loop()));
    }

    /// Cancel the pending renewal, if any. The current credential is kept.
    pub fn stop(&self) {
        if let Some(handle) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }

    /// The current credential if it is not expired right now.
    #[must_use]
    pub fn ensure_fresh(&self) -> Option<Arc<Credential>> {
        let current = self.updates.borrow().clone()?;
        if current.is_expired_at(Utc::now()) {
            return None;
        }
        Some(current)
    }

    /// Wait until a fresh credential is available, up to `timeout`.
    pub async fn wait_for_credential(&self, timeout: Duration) -> Option<Arc<Credential>> {
        let mut updates = self.updates.clone();
        let waited = tokio::time::timeout(timeout, async {
            loop {
                if let Some(credential) = self.ensure_fresh() {
                    return Some(credential);
                }
                if updates.changed().await.is_err() {
                    return None;
                }
            }
        })
        .await;
        waited.ok().flatten()
    }
}

impl Drop for TokenManager {
    fn drop(&mut self) {
        self.stop();
    }
}
