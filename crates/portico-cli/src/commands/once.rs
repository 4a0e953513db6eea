use std::time::Duration;

use anyhow::Context;
use portico_config::PorticoConfig;
use portico_core::PortalDialect;
use portico_sync::{CycleOutcome, CycleReport};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::OnceArgs;
use crate::commands::shared::build_runtime;
use crate::output::output;

#[derive(Debug, Serialize)]
struct OnceResponse {
    outcome: &'static str,
    dialect: PortalDialect,
    api_records: usize,
    entities: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    fetch_error: Option<String>,
}

impl From<CycleReport> for OnceResponse {
    fn from(report: CycleReport) -> Self {
        Self {
            outcome: match report.outcome {
                CycleOutcome::Skipped => "skipped",
                CycleOutcome::Published => "published",
            },
            dialect: report.dialect,
            api_records: report.api_records,
            entities: report.entities,
            fetch_error: report.fetch_error,
        }
    }
}

/// Handle `portico once`.
pub async fn handle(
    args: &OnceArgs,
    config: &PorticoConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let runtime = build_runtime(config)?;
    runtime.tokens.start();

    let wait = args
        .wait_secs
        .map_or_else(|| config.sync.timeout(), Duration::from_secs);
    if runtime.tokens.wait_for_credential(wait).await.is_none() {
        tracing::warn!(waited_secs = wait.as_secs(), "no access token obtained");
    }

    let report = tokio::time::timeout(config.sync.timeout(), runtime.orchestrator.run_cycle())
        .await
        .context("sync cycle timed out")?
        .context("sync cycle failed")?;
    runtime.tokens.stop();

    output(&OnceResponse::from(report), flags.format)
}
