//! Catalog sinks.
//!
//! A [`CatalogConnection`] receives one full mutation batch per cycle. Every
//! sink gives the batch replace-all semantics for its location key: the
//! HTTP ingest endpoint by contract, the file sink by overwriting.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use portico_config::CatalogConfig;
use portico_core::MutationBatch;

use crate::error::CatalogError;

/// Destination catalog for mutation batches.
#[async_trait]
pub trait CatalogConnection: Send + Sync {
    /// Submit a full replacement set. Errors are returned to the caller
    /// unretried.
    async fn apply_mutation(&self, batch: MutationBatch) -> Result<(), CatalogError>;

    /// Short description used in logs.
    fn describe(&self) -> String;
}

/// POSTs each batch as JSON to a catalog ingest endpoint.
#[derive(Debug, Clone)]
pub struct HttpCatalogConnection {
    http: reqwest::Client,
    ingest_url: String,
}

impl HttpCatalogConnection {
    #[must_use]
    pub fn new(http: reqwest::Client, ingest_url: &str) -> Self {
        Self {
            http,
            ingest_url: ingest_url.trim().to_string(),
        }
    }
}

#[async_trait]
impl CatalogConnection for HttpCatalogConnection {
    async fn apply_mutation(&self, batch: MutationBatch) -> Result<(), CatalogError> {
        let resp = self.http.post(&self.ingest_url).json(&batch).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Rejected {
                status: status.as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        tracing::debug!(url = %self.ingest_url, entities = batch.entities.len(), "batch accepted");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("ingest endpoint {}", self.ingest_url)
    }
}

/// Writes each batch as pretty JSON, replacing the previous file.
#[derive(Debug, Clone)]
pub struct FileCatalogConnection {
    path: PathBuf,
}

impl FileCatalogConnection {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CatalogConnection for FileCatalogConnection {
    async fn apply_mutation(&self, batch: MutationBatch) -> Result<(), CatalogError> {
        let body = serde_json::to_vec_pretty(&batch)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CatalogError::Io(format!("mkdir {}: {e}", parent.display())))?;
        }
        let staging = self.staging_path();
        tokio::fs::write(&staging, body)
            .await
            .map_err(|e| CatalogError::Io(format!("write {}: {e}", staging.display())))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| CatalogError::Io(format!("rename to {}: {e}", self.path.display())))?;
        tracing::debug!(path = %self.path.display(), entities = batch.entities.len(), "batch written");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// Pick the sink named by the catalog configuration.
#[must_use]
pub fn connection_for(config: &CatalogConfig, http: reqwest::Client) -> Box<dyn CatalogConnection> {
    if config.uses_ingest_url() {
        Box::new(HttpCatalogConnection::new(http, &config.ingest_url))
    } else {
        Box::new(FileCatalogConnection::new(config.output_path()))
    }
}
