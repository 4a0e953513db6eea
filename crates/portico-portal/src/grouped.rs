//! Grouped-by-product dialect (`GET /apis?includeSchema=true`).
//!
//! The discovery payload is either a list of API products, each carrying
//! its versions under `apiVersions`, or an already-flat list of version
//! entries. Entries without an inline schema get one follow-up
//! `GET /apis/{apiId}/schema`.

use std::collections::BTreeMap;

use portico_core::{ApiVersionRecord, SchemaDocument};
use serde::Deserialize;
use serde_json::Value;

use crate::{PortalClient, PortalError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductGroup {
    #[serde(default)]
    api_product_id: Option<String>,
    #[serde(default)]
    api_product_display_name: Option<String>,
    #[serde(default)]
    api_product_description: Option<String>,
    #[serde(default)]
    api_versions: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionEntry {
    api_id: String,
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    api_product_id: Option<String>,
    #[serde(default)]
    api_product_display_name: Option<String>,
    #[serde(default)]
    api_product_description: Option<String>,
    #[serde(default)]
    schema: Value,
    #[serde(default)]
    schema_fetch_error: Option<String>,
    #[serde(default)]
    custom_metadata: BTreeMap<String, Value>,
    #[serde(default)]
    usage_plans: Vec<String>,
}

/// A normalized record plus whether its schema still has to be fetched.
#[derive(Debug)]
pub(crate) struct Pending {
    pub record: ApiVersionRecord,
    pub needs_schema: bool,
}

fn parse_entry(value: Value) -> Option<VersionEntry> {
    match serde_json::from_value::<VersionEntry>(value) {
        Ok(entry) => Some(entry),
        Err(error) => {
            tracing::warn!(%error, "skipping malformed API version entry");
            None
        }
    }
}

/// Flatten the discovery payload into one entry per API version.
fn flatten(items: Vec<Value>) -> Vec<VersionEntry> {
    let mut entries = Vec::new();
    for item in items {
        if item.get("apiVersions").is_none() {
            entries.extend(parse_entry(item));
            continue;
        }
        let group = match serde_json::from_value::<ProductGroup>(item) {
            Ok(group) => group,
            Err(error) => {
                tracing::warn!(%error, "skipping malformed API product");
                continue;
            }
        };
        for version in group.api_versions {
            let Some(mut entry) = parse_entry(version) else {
                continue;
            };
            entry.api_product_id = entry.api_product_id.or_else(|| group.api_product_id.clone());
            entry.api_product_display_name = entry
                .api_product_display_name
                .or_else(|| group.api_product_display_name.clone());
            entry.api_product_description = entry
                .api_product_description
                .or_else(|| group.api_product_description.clone());
            entries.push(entry);
        }
    }
    entries
}

pub(crate) fn metadata_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn into_pending(entry: VersionEntry) -> Pending {
    let schema_document = SchemaDocument::from_value(entry.schema);
    let fetch_error = entry.schema_fetch_error.filter(|e| !e.is_empty());
    if let Some(error) = &fetch_error {
        tracing::warn!(api_id = %entry.api_id, error = %error, "portal could not load the API schema");
    }
    let needs_schema = schema_document.is_none() && fetch_error.is_none();
    let display_title = entry
        .title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| entry.api_id.clone());
    Pending {
        needs_schema,
        record: ApiVersionRecord {
            id: entry.api_id,
            display_title,
            description: entry.description.unwrap_or_default(),
            schema_document,
            version_tag: entry.api_version.filter(|v| !v.is_empty()),
            product_description: entry.api_product_description,
            product_id: entry.api_product_id,
            product_display_name: entry.api_product_display_name,
            custom_metadata: entry
                .custom_metadata
                .into_iter()
                .map(|(k, v)| (k, metadata_value(v)))
                .collect(),
            usage_plans: entry.usage_plans,
        },
    }
}

/// Map a grouped-dialect discovery payload to pending records.
pub(crate) fn to_pending(items: Vec<Value>) -> Vec<Pending> {
    flatten(items).into_iter().map(into_pending).collect()
}

impl PortalClient {
    /// Normalize a grouped-dialect payload, fetching missing schemas.
    pub(crate) async fn normalize_grouped(
        &self,
        items: Vec<Value>,
        auth_header: &str,
    ) -> Vec<ApiVersionRecord> {
        let mut pending = to_pending(items);
        let mut set = tokio::task::JoinSet::new();

        for (idx, item) in pending.iter().enumerate().filter(|(_, p)| p.needs_schema) {
            let url = format!(
                "{}/apis/{}/schema",
                self.base_url,
                urlencoding::encode(&item.record.id)
            );
            let http = self.http.clone();
            let auth_header = auth_header.to_string();
            set.spawn(async move {
                let result = Self::get_json(&http, &url, &auth_header).await;
                (idx, url, result)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, url, result)) => attach_schema(&mut pending[idx], &url, result),
                Err(e) => tracing::warn!(%e, "schema fetch task failed"),
            }
        }

        pending.into_iter().map(|p| p.record).collect()
    }
}

fn attach_schema(pending: &mut Pending, url: &str, result: Result<Value, PortalError>) {
    match result {
        Ok(schema) => pending.record.schema_document = SchemaDocument::from_value(schema),
        Err(error) => tracing::warn!(
            api_id = %pending.record.id,
            url,
            %error,
            "could not fetch API schema; publishing without it"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn items(value: Value) -> Vec<Value> {
        value.as_array().cloned().unwrap()
    }

    #[test]
    fn grouped_payload_flattens_with_product_fields() {
        let pending = to_pending(items(json!([
            {
                "apiProductId": "p1",
                "apiProductDisplayName": "Tracks",
                "apiVersions": [
                    {"apiId": "a1", "apiVersion": "v1"},
                    {"apiId": "a2", "apiVersion": "v2", "title": "Tracks v2", "schema": {"openapi": "3.0.0"}}
                ]
            },
            {"apiProductId": "p2", "apiVersions": []}
        ])));

        assert_eq!(pending.len(), 2);
        let first = &pending[0].record;
        assert_eq!(first.id, "a1");
        assert_eq!(first.version_tag.as_deref(), Some("v1"));
        assert_eq!(first.product_id.as_deref(), Some("p1"));
        assert_eq!(first.product_display_name.as_deref(), Some("Tracks"));
        assert_eq!(first.display_title, "a1");
        assert!(pending[0].needs_schema);

        let second = &pending[1].record;
        assert_eq!(second.display_title, "Tracks v2");
        assert!(second.has_schema());
        assert!(!pending[1].needs_schema);
    }

    #[test]
    fn flat_payload_maps_directly() {
        let pending = to_pending(items(json!([
            {
                "apiId": "petstore",
                "apiVersion": "1.0.0",
                "description": "Pets",
                "apiProductId": "animals",
                "schema": "openapi: 3.0.0",
                "customMetadata": {"team": "zoo", "tier": 2},
                "usagePlans": ["gold"]
            }
        ])));

        assert_eq!(pending.len(), 1);
        let record = &pending[0].record;
        assert_eq!(record.description, "Pets");
        assert_eq!(
            record.schema_document,
            Some(SchemaDocument::Text("openapi: 3.0.0".into()))
        );
        assert_eq!(record.custom_metadata.get("team").map(String::as_str), Some("zoo"));
        assert_eq!(record.custom_metadata.get("tier").map(String::as_str), Some("2"));
        assert_eq!(record.usage_plans, vec!["gold".to_string()]);
        assert!(!pending[0].needs_schema);
    }

    #[test]
    fn schema_fetch_error_suppresses_follow_up_fetch() {
        let pending = to_pending(items(json!([
            {"apiId": "broken", "schemaFetchError": "upstream 404"}
        ])));
        assert!(!pending[0].needs_schema);
        assert!(!pending[0].record.has_schema());
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let pending = to_pending(items(json!([
            {"apiId": "ok"},
            {"apiVersion": "missing-id"},
            {"apiProductId": "p", "apiVersions": [{"apiId": 7}, {"apiId": "fine"}]}
        ])));
        let ids: Vec<&str> = pending.iter().map(|p| p.record.id.as_str()).collect();
        assert_eq!(ids, vec!["ok", "fine"]);
    }

    #[test]
    fn entry_fields_win_over_group_fields() {
        let pending = to_pending(items(json!([
            {
                "apiProductId": "group",
                "apiVersions": [{"apiId": "a1", "apiProductId": "own"}]
            }
        ])));
        assert_eq!(pending[0].record.product_id.as_deref(), Some("own"));
    }

    #[test]
    fn failed_schema_fetch_keeps_record() {
        let mut pending = to_pending(items(json!([{"apiId": "a1"}])));
        attach_schema(
            &mut pending[0],
            "http://portal/apis/a1/schema",
            Err(PortalError::Api {
                status: 500,
                message: "boom".into(),
            }),
        );
        assert_eq!(pending[0].record.id, "a1");
        assert!(!pending[0].record.has_schema());
    }
}
