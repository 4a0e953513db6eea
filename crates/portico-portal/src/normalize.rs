//! Dialect discovery with bounded fallback.

use std::sync::{PoisonError, RwLock};

use portico_core::{ApiVersionRecord, PortalDialect};
use serde_json::Value;

use crate::detect::{classify, is_empty_listing};
use crate::{PortalClient, PortalError};

#[derive(Debug, Clone, PartialEq, Eq)]
struct SlotState {
    dialect: PortalDialect,
    discovery_url: String,
}

/// Sticky dialect for one portal server, with the discovery endpoint it
/// implies. Both are replaced together.
#[derive(Debug)]
pub struct DialectSlot {
    base_url: String,
    state: RwLock<SlotState>,
}

impl DialectSlot {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        let dialect = PortalDialect::Unknown;
        Self {
            state: RwLock::new(SlotState {
                dialect,
                discovery_url: dialect.discovery_url(&base_url),
            }),
            base_url,
        }
    }

    #[must_use]
    pub fn dialect(&self) -> PortalDialect {
        self.read().dialect
    }

    /// Discovery endpoint for the current dialect.
    #[must_use]
    pub fn discovery_url(&self) -> String {
        self.read().discovery_url
    }

    /// Record a detected dialect. `Unknown` is ignored: once known, the
    /// slot never forgets.
    pub fn set(&self, dialect: PortalDialect) {
        if !dialect.is_known() {
            return;
        }
        let next = SlotState {
            dialect,
            discovery_url: dialect.discovery_url(&self.base_url),
        };
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.dialect != dialect {
            tracing::info!(from = %state.dialect, to = %dialect, "portal dialect changed");
        }
        *state = next;
    }

    fn read(&self) -> SlotState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Result of one discovery pass.
#[derive(Debug, Clone)]
pub struct Normalized {
    /// Dialect that produced the records (the slot's dialect when the
    /// portal reported nothing).
    pub dialect: PortalDialect,
    /// Discovery endpoint that answered.
    pub discovery_url: String,
    pub records: Vec<ApiVersionRecord>,
}

impl PortalClient {
    /// Discover and normalize every API version the portal exposes.
    ///
    /// The slot's dialect is probed first (grouped-by-product when unknown).
    /// If that endpoint fails or answers in another shape, the alternate
    /// endpoint is probed once. Per-item schema and per-product version
    /// failures are logged and skipped, never returned.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Discovery`] when neither endpoint produced a
    /// usable listing.
    pub async fn fetch_and_normalize(
        &self,
        auth_header: &str,
        slot: &DialectSlot,
    ) -> Result<Normalized, PortalError> {
        let current = slot.dialect();
        let first = if current.is_known() {
            current
        } else {
            PortalDialect::GroupedByProduct
        };

        let mut empty_at: Option<String> = None;
        let mut last_failure: Option<(String, PortalError)> = None;

        for probe in [first, first.alternate()] {
            let url = probe.discovery_url(&self.base_url);
            let payload = match Self::get_json(&self.http, &url, auth_header).await {
                Ok(payload) => payload,
                Err(error) => {
                    tracing::warn!(%url, %error, dialect = %probe, "discovery request failed");
                    last_failure = Some((url, error));
                    continue;
                }
            };
            self.log_payload("discovery listing", &url, &payload);

            let found = classify(&payload);
            if found == probe {
                let records = self.normalize_as(probe, payload, auth_header).await;
                slot.set(probe);
                self.log_records(&records);
                return Ok(Normalized {
                    dialect: probe,
                    discovery_url: url,
                    records,
                });
            }

            if is_empty_listing(&payload) {
                tracing::debug!(%url, "discovery listing is empty");
                empty_at.get_or_insert(url);
            } else {
                tracing::warn!(%url, expected = %probe, %found, "discovery response has an unexpected shape");
                last_failure = Some((
                    url.clone(),
                    PortalError::DialectMismatch {
                        endpoint: url,
                        expected: probe,
                        found,
                    },
                ));
            }
        }

        if let Some(url) = empty_at {
            return Ok(Normalized {
                dialect: slot.dialect(),
                discovery_url: url,
                records: Vec::new(),
            });
        }

        let (endpoint, source) = last_failure.unwrap_or_else(|| {
            let endpoint = first.discovery_url(&self.base_url);
            let source = PortalError::Parse("no discovery endpoint answered".into());
            (endpoint, source)
        });
        Err(PortalError::Discovery {
            endpoint,
            source: Box::new(source),
        })
    }

    async fn normalize_as(
        &self,
        dialect: PortalDialect,
        payload: Value,
        auth_header: &str,
    ) -> Vec<ApiVersionRecord> {
        let items = match payload {
            Value::Array(items) => items,
            _ => Vec::new(),
        };
        match dialect {
            PortalDialect::GroupedByProduct => self.normalize_grouped(items, auth_header).await,
            PortalDialect::FlatWithSummaries => self.normalize_summaries(items, auth_header).await,
            PortalDialect::Unknown => Vec::new(),
        }
    }
}
