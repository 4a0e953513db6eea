//! Catalog ownership and sink configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_group_name() -> String {
    "portal-service-accounts".to_string()
}

fn default_service_account_name() -> String {
    "portal-service-account".to_string()
}

fn default_system_name() -> String {
    "portal-apis".to_string()
}

fn default_output_path() -> String {
    "portico-catalog.json".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Name of the group that owns the service account.
    #[serde(default = "default_group_name")]
    pub group_name: String,

    /// Name of the service-account user that owns every API entity.
    #[serde(default = "default_service_account_name")]
    pub service_account_name: String,

    /// Name of the system grouping all API entities.
    #[serde(default = "default_system_name")]
    pub system_name: String,

    /// When set, mutation batches are POSTed here as JSON.
    #[serde(default)]
    pub ingest_url: String,

    /// Otherwise, mutation batches are written to this file.
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            group_name: default_group_name(),
            service_account_name: default_service_account_name(),
            system_name: default_system_name(),
            ingest_url: String::new(),
            output_path: default_output_path(),
        }
    }
}

impl CatalogConfig {
    /// Whether batches should go to an HTTP ingest endpoint.
    #[must_use]
    pub fn uses_ingest_url(&self) -> bool {
        !self.ingest_url.trim().is_empty()
    }

    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output_path)
    }
}
