use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use portico_auth::{ClientCredentials, TokenClient, TokenManager};
use portico_catalog::{CatalogConnection, EntityMutationBuilder, OwnershipNames, connection_for};
use portico_config::PorticoConfig;
use portico_portal::PortalClient;
use portico_sync::{CredentialSource, SyncOrchestrator};

/// Everything a sync run needs, wired from configuration.
pub struct SyncRuntime {
    pub tokens: Arc<TokenManager>,
    pub orchestrator: Arc<SyncOrchestrator>,
}

pub fn build_runtime(config: &PorticoConfig) -> anyhow::Result<SyncRuntime> {
    config
        .portal
        .require_configured()
        .context("cannot authenticate with the portal")?;

    let timeout = Duration::from_secs(config.portal.request_timeout_secs);
    let http = reqwest::Client::builder()
        .user_agent(concat!("portico/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")?;

    let tokens = Arc::new(TokenManager::new(
        TokenClient::new(
            http.clone(),
            ClientCredentials {
                token_endpoint: config.portal.token_endpoint.trim().to_string(),
                client_id: config.portal.client_id.clone(),
                client_secret: config.portal.client_secret.clone(),
            },
        ),
        config.portal.debug_logging,
    ));

    let server_url = config.portal.server_url();
    let portal = PortalClient::with_http(http.clone(), &server_url, config.portal.debug_logging);
    let builder = EntityMutationBuilder::new(
        OwnershipNames::from(&config.catalog),
        &config.provider_name(),
        &server_url,
    );
    let catalog: Arc<dyn CatalogConnection> = Arc::from(connection_for(&config.catalog, http));

    tracing::info!(
        provider = %config.provider_name(),
        portal = %server_url,
        sink = %catalog.describe(),
        "portico configured"
    );

    let orchestrator = Arc::new(SyncOrchestrator::new(
        Arc::clone(&tokens) as Arc<dyn CredentialSource>,
        portal,
        builder,
        catalog,
        config.portal.debug_logging,
    ));

    Ok(SyncRuntime {
        tokens,
        orchestrator,
    })
}

#[cfg(test)]
mod tests {
    use portico_config::{PortalConfig, PorticoConfig};

    use super::build_runtime;

    #[test]
    fn refuses_to_start_without_oauth_client() {
        let error = build_runtime(&PorticoConfig::default()).err().unwrap();
        let message = format!("{error:#}");
        assert!(message.contains("client_id"), "{message}");
    }

    #[tokio::test]
    async fn wires_a_configured_runtime() {
        let config = PorticoConfig {
            portal: PortalConfig {
                client_id: "portico".into(),
                client_secret: "secret".into(),
                token_endpoint: "http://idp/token".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let runtime = build_runtime(&config).unwrap();
        assert!(runtime.tokens.ensure_fresh().is_none());
        assert_eq!(
            runtime.orchestrator.dialect(),
            portico_core::PortalDialect::Unknown
        );
    }
}
