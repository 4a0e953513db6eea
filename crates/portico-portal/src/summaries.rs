//! Flat product-summary dialect (`GET /api-products`).
//!
//! Discovery yields one summary per product; each product's versions come
//! from `GET /{productId}/versions`. A product whose versions cannot be
//! fetched contributes nothing to the cycle.

use std::collections::BTreeMap;

use portico_core::{ApiVersionRecord, SchemaDocument};
use serde::Deserialize;
use serde_json::Value;

use crate::grouped::metadata_value;
use crate::{PortalClient, PortalError};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductSummary {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductVersion {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "schema")]
    openapi_spec: Value,
    #[serde(default)]
    custom_metadata: BTreeMap<String, Value>,
    #[serde(default)]
    usage_plans: Vec<String>,
}

fn parse_summaries(items: Vec<Value>) -> Vec<ProductSummary> {
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<ProductSummary>(item) {
            Ok(summary) => Some(summary),
            Err(error) => {
                tracing::warn!(%error, "skipping malformed API product summary");
                None
            }
        })
        .collect()
}

/// Map one product's versions payload to records.
fn versions_to_records(
    summary: &ProductSummary,
    payload: Value,
) -> Result<Vec<ApiVersionRecord>, PortalError> {
    let Value::Array(items) = payload else {
        return Err(PortalError::Parse(format!(
            "expected an array of versions for product '{}'",
            summary.id
        )));
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<ProductVersion>(item) {
            Ok(version) => Some(version),
            Err(error) => {
                tracing::warn!(product_id = %summary.id, %error, "skipping malformed API version");
                None
            }
        })
        .map(|version| {
            let display_title = version
                .title
                .or_else(|| version.name.clone())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| version.id.clone());
            ApiVersionRecord {
                display_title,
                description: version
                    .description
                    .or_else(|| summary.description.clone())
                    .unwrap_or_default(),
                schema_document: SchemaDocument::from_value(version.openapi_spec),
                version_tag: version.name.filter(|n| !n.is_empty()),
                product_description: summary.description.clone(),
                product_id: Some(summary.id.clone()),
                product_display_name: summary.name.clone(),
                custom_metadata: version
                    .custom_metadata
                    .into_iter()
                    .map(|(key, value)| (key, metadata_value(value)))
                    .collect(),
                usage_plans: version.usage_plans,
                id: version.id,
            }
        })
        .collect())
}

impl PortalClient {
    /// Normalize a summary-dialect payload, fetching each product's versions.
    pub(crate) async fn normalize_summaries(
        &self,
        items: Vec<Value>,
        auth_header: &str,
    ) -> Vec<ApiVersionRecord> {
        let summaries = parse_summaries(items);
        let mut set = tokio::task::JoinSet::new();

        for (idx, summary) in summaries.iter().enumerate() {
            let url = format!(
                "{}/{}/versions",
                self.base_url,
                urlencoding::encode(&summary.id)
            );
            let http = self.http.clone();
            let auth_header = auth_header.to_string();
            set.spawn(async move {
                let result = Self::get_json(&http, &url, &auth_header).await;
                (idx, url, result)
            });
        }

        let mut per_product: Vec<Option<Vec<ApiVersionRecord>>> = vec![None; summaries.len()];
        while let Some(joined) = set.join_next().await {
            let (idx, url, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::warn!(%e, "product versions task failed");
                    continue;
                }
            };
            let summary = &summaries[idx];
            match result.and_then(|payload| versions_to_records(summary, payload)) {
                Ok(records) => {
                    self.log_payload_count(&summary.id, records.len());
                    per_product[idx] = Some(records);
                }
                Err(error) => tracing::warn!(
                    product_id = %summary.id,
                    url,
                    %error,
                    "could not fetch API product versions; skipping product"
                ),
            }
        }

        per_product.into_iter().flatten().flatten().collect()
    }

    fn log_payload_count(&self, product_id: &str, count: usize) {
        if self.debug_logging {
            tracing::info!(product_id, count, "fetched API product versions");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn summary() -> ProductSummary {
        ProductSummary {
            id: "p1".into(),
            name: Some("Tracks".into()),
            description: Some("d".into()),
        }
    }

    #[test]
    fn versions_carry_product_description() {
        let records =
            versions_to_records(&summary(), json!([{"id": "v1", "name": "n"}])).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, "v1");
        assert_eq!(record.display_title, "n");
        assert_eq!(record.version_tag.as_deref(), Some("n"));
        assert_eq!(record.product_description.as_deref(), Some("d"));
        assert_eq!(record.description, "d");
        assert_eq!(record.product_id.as_deref(), Some("p1"));
        assert_eq!(record.product_display_name.as_deref(), Some("Tracks"));
        assert!(!record.has_schema());
    }

    #[test]
    fn version_schema_from_openapi_spec_or_schema() {
        let records = versions_to_records(
            &summary(),
            json!([
                {"id": "v1", "openapiSpec": {"openapi": "3.1.0"}},
                {"id": "v2", "schema": "openapi: 3.0.0", "description": "own"}
            ]),
        )
        .unwrap();
        assert!(matches!(records[0].schema_document, Some(SchemaDocument::Json(_))));
        assert_eq!(
            records[1].schema_document,
            Some(SchemaDocument::Text("openapi: 3.0.0".into()))
        );
        assert_eq!(records[1].description, "own");
    }

    #[test]
    fn one_malformed_version_keeps_its_siblings() {
        let records = versions_to_records(
            &summary(),
            json!([
                {"id": "v1", "name": "n"},
                {"name": "no id"},
                {"id": "v2", "customMetadata": {"tier": 2, "team": "zoo"}}
            ]),
        )
        .unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "v2"]);
        assert_eq!(records[1].custom_metadata["tier"], "2");
        assert_eq!(records[1].custom_metadata["team"], "zoo");
    }

    #[test]
    fn non_array_versions_payload_is_a_parse_error() {
        let err = versions_to_records(&summary(), json!({"message": "nope"})).unwrap_err();
        assert!(matches!(err, PortalError::Parse(_)));
    }

    #[test]
    fn malformed_summaries_are_skipped() {
        let summaries = parse_summaries(vec![
            json!({"id": "p1"}),
            json!({"description": "no id"}),
            json!({"id": "p2", "versionsCount": 3}),
        ]);
        let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }
}
