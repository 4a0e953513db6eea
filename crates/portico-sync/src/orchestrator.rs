//! One sync cycle: credential, discovery, build, publish.

use std::sync::{Arc, Mutex, PoisonError};

use portico_auth::{Credential, TokenManager};
use portico_catalog::{CatalogConnection, EntityMutationBuilder};
use portico_core::{EntityKind, MutationBatch, PortalDialect};
use portico_portal::{DialectSlot, PortalClient, PortalError};

use crate::error::SyncError;

/// Where a cycle gets its bearer credential from.
pub trait CredentialSource: Send + Sync {
    /// The current credential, if one is available and unexpired.
    fn current(&self) -> Option<Arc<Credential>>;
}

impl CredentialSource for TokenManager {
    fn current(&self) -> Option<Arc<Credential>> {
        self.ensure_fresh()
    }
}

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No credential was available; nothing was published.
    Skipped,
    /// A batch was submitted to the catalog.
    Published,
}

/// Summary of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// Sticky dialect after the cycle.
    pub dialect: PortalDialect,
    /// API entities published.
    pub api_records: usize,
    /// All entities published, organizational ones included.
    pub entities: usize,
    /// Discovery failure that was swallowed, if any.
    pub fetch_error: Option<String>,
}

impl CycleReport {
    const fn skipped(dialect: PortalDialect) -> Self {
        Self {
            outcome: CycleOutcome::Skipped,
            dialect,
            api_records: 0,
            entities: 0,
            fetch_error: None,
        }
    }
}

/// Drives sync cycles against one portal server and one catalog.
///
/// Holds the only state shared across cycles: the sticky dialect and the
/// discovery endpoint API entities are attributed to. Cycles must not
/// overlap; the scheduler runs them one at a time.
pub struct SyncOrchestrator {
    credentials: Arc<dyn CredentialSource>,
    portal: PortalClient,
    dialect: DialectSlot,
    builder: Mutex<EntityMutationBuilder>,
    catalog: Arc<dyn CatalogConnection>,
    debug_logging: bool,
}

impl SyncOrchestrator {
    #[must_use]
    pub fn new(
        credentials: Arc<dyn CredentialSource>,
        portal: PortalClient,
        builder: EntityMutationBuilder,
        catalog: Arc<dyn CatalogConnection>,
        debug_logging: bool,
    ) -> Self {
        Self {
            dialect: DialectSlot::new(portal.base_url()),
            credentials,
            portal,
            builder: Mutex::new(builder),
            catalog,
            debug_logging,
        }
    }

    #[must_use]
    pub fn dialect(&self) -> PortalDialect {
        self.dialect.dialect()
    }

    /// Run one cycle.
    ///
    /// Skips when no credential is available. Any discovery or
    /// normalization failure is logged with the endpoint involved and the
    /// cycle publishes the organizational entities alone.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] only when the batch is invalid or the catalog
    /// rejects it.
    pub async fn run_cycle(&self) -> Result<CycleReport, SyncError> {
        let Some(credential) = self.credentials.current() else {
            tracing::warn!("no access token available; skipping sync cycle");
            return Ok(CycleReport::skipped(self.dialect()));
        };

        let (records, fetch_error) = match self
            .portal
            .fetch_and_normalize(&credential.bearer(), &self.dialect)
            .await
        {
            Ok(normalized) => {
                self.builder
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .set_apis_endpoint(&normalized.discovery_url);
                (normalized.records, None)
            }
            Err(error) => {
                let url = match &error {
                    PortalError::Discovery { endpoint, .. } => endpoint.clone(),
                    _ => self.dialect.discovery_url(),
                };
                tracing::error!(
                    %url,
                    %error,
                    "could not fetch APIs from the portal; publishing organizational entities only"
                );
                (Vec::new(), Some(error.to_string()))
            }
        };

        let batch = self
            .builder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .build(&records);
        batch.validate()?;
        self.log_batch(&batch);

        let api_records = batch.count_kind(EntityKind::Api);
        let entities = batch.entities.len();
        self.catalog.apply_mutation(batch).await?;
        tracing::info!(
            api_records,
            entities,
            sink = %self.catalog.describe(),
            "published catalog batch"
        );

        Ok(CycleReport {
            outcome: CycleOutcome::Published,
            dialect: self.dialect(),
            api_records,
            entities,
            fetch_error,
        })
    }

    fn log_batch(&self, batch: &MutationBatch) {
        if self.debug_logging {
            let names = batch.names_of(EntityKind::Api);
            tracing::info!(count = names.len(), ?names, "built API entities");
        }
    }
}
