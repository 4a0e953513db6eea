use std::sync::Arc;

use anyhow::Context;
use portico_config::PorticoConfig;
use portico_sync::{TaskDefinition, TaskScheduler, refresh_task_id};

use crate::commands::shared::build_runtime;

/// Handle `portico run`.
pub async fn handle(config: &PorticoConfig) -> anyhow::Result<()> {
    let runtime = build_runtime(config)?;
    runtime.tokens.start();

    let mut scheduler = TaskScheduler::new();
    let orchestrator = Arc::clone(&runtime.orchestrator);
    scheduler.schedule_task(
        TaskDefinition {
            id: refresh_task_id(&config.provider_name()),
            frequency: config.sync.frequency(),
            timeout: config.sync.timeout(),
        },
        move || {
            let orchestrator = Arc::clone(&orchestrator);
            async move { orchestrator.run_cycle().await.map(|_| ()) }
        },
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutting down");

    scheduler.shutdown().await;
    runtime.tokens.stop();
    Ok(())
}
