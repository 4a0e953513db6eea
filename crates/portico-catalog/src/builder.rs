//! Maps normalized API versions to a replace-all catalog batch.

use std::collections::HashSet;

use portico_config::CatalogConfig;
use portico_core::{ApiVersionRecord, CatalogEntity, EntityKind, EntityMetadata, MutationBatch};
use serde_json::json;

use crate::sanitize::{SanitizeTarget, sanitize};

/// Tag stamped on every entity this provider owns.
pub const PROVIDER_TAG: &str = "portal";

/// Prefix for annotations copied from portal custom metadata.
pub const METADATA_ANNOTATION_PREFIX: &str = "portal.portico.dev/";

/// Names of the three organizational entities published every cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipNames {
    pub group: String,
    pub service_account: String,
    pub system: String,
}

impl From<&CatalogConfig> for OwnershipNames {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            group: sanitize(SanitizeTarget::Name, &config.group_name),
            service_account: sanitize(SanitizeTarget::Name, &config.service_account_name),
            system: sanitize(SanitizeTarget::Name, &config.system_name),
        }
    }
}

impl Default for OwnershipNames {
    fn default() -> Self {
        Self::from(&CatalogConfig::default())
    }
}

/// Builds the full entity set for one cycle.
///
/// Organizational entities are attributed to the portal server URL; API
/// entities to the discovery endpoint that produced them.
#[derive(Debug, Clone)]
pub struct EntityMutationBuilder {
    names: OwnershipNames,
    location_key: String,
    portal_server_url: String,
    apis_endpoint: String,
}

impl EntityMutationBuilder {
    #[must_use]
    pub fn new(names: OwnershipNames, location_key: &str, portal_server_url: &str) -> Self {
        Self {
            names,
            location_key: location_key.to_string(),
            portal_server_url: portal_server_url.to_string(),
            apis_endpoint: portal_server_url.to_string(),
        }
    }

    /// Track the discovery endpoint that API entities are attributed to.
    pub fn set_apis_endpoint(&mut self, apis_endpoint: &str) {
        apis_endpoint.clone_into(&mut self.apis_endpoint);
    }

    #[must_use]
    pub fn apis_endpoint(&self) -> &str {
        &self.apis_endpoint
    }

    #[must_use]
    pub fn location_key(&self) -> &str {
        &self.location_key
    }

    #[must_use]
    pub const fn names(&self) -> &OwnershipNames {
        &self.names
    }

    /// Group, service account and system first, then one API entity per
    /// record. Records whose sanitized name is empty or already taken are
    /// skipped with a warning.
    #[must_use]
    pub fn build(&self, records: &[ApiVersionRecord]) -> MutationBatch {
        let mut entities = vec![self.group(), self.service_account(), self.system()];
        let mut seen = HashSet::new();
        for record in records {
            let entity = self.api_entity(record);
            if entity.name().is_empty() {
                tracing::warn!(api_id = %record.id, "API id sanitizes to an empty name; skipping");
                continue;
            }
            if !seen.insert(entity.name().to_string()) {
                tracing::warn!(
                    api_id = %record.id,
                    name = entity.name(),
                    "duplicate API entity name; keeping the first"
                );
                continue;
            }
            entities.push(entity);
        }
        MutationBatch::full(&self.location_key, entities)
    }

    /// The catalog entity for one API version.
    #[must_use]
    pub fn api_entity(&self, record: &ApiVersionRecord) -> CatalogEntity {
        let mut metadata = EntityMetadata::managed(
            sanitize(SanitizeTarget::Name, &record.id),
            &self.apis_endpoint,
        );
        metadata.title = Some(record.display_title.clone());
        metadata.description = Some(record.description.clone()).filter(|d| !d.is_empty());

        metadata.tags.push(PROVIDER_TAG.to_string());
        if let Some(version) = &record.version_tag {
            metadata
                .tags
                .push(format!("api-version:{}", sanitize(SanitizeTarget::Tag, version)));
        }
        if let Some(product) = &record.product_id {
            metadata
                .tags
                .push(format!("api-product:{}", sanitize(SanitizeTarget::Tag, product)));
        }

        for (key, value) in &record.custom_metadata {
            let key = sanitize(SanitizeTarget::Name, key);
            if key.is_empty() {
                continue;
            }
            metadata
                .annotations
                .insert(format!("{METADATA_ANNOTATION_PREFIX}{key}"), value.clone());
        }
        if !record.usage_plans.is_empty() {
            metadata.annotations.insert(
                format!("{METADATA_ANNOTATION_PREFIX}usage-plans"),
                record.usage_plans.join(","),
            );
        }

        let definition = record
            .schema_document
            .as_ref()
            .map(portico_core::SchemaDocument::to_definition)
            .unwrap_or_default();

        CatalogEntity::new(
            EntityKind::Api,
            metadata,
            json!({
                "type": "openapi",
                "lifecycle": "production",
                "system": self.names.system,
                "owner": format!("user:{}", self.names.service_account),
                "definition": definition,
            }),
        )
    }

    fn group(&self) -> CatalogEntity {
        CatalogEntity::new(
            EntityKind::Group,
            EntityMetadata::managed(&self.names.group, &self.portal_server_url),
            json!({
                "type": "service-account-group",
                "children": [],
                "members": [self.names.service_account],
            }),
        )
    }

    fn service_account(&self) -> CatalogEntity {
        CatalogEntity::new(
            EntityKind::User,
            EntityMetadata::managed(&self.names.service_account, &self.portal_server_url),
            json!({
                "displayName": "Portal Service Account",
                "email": "",
                "picture": "",
                "memberOf": [self.names.group],
            }),
        )
    }

    fn system(&self) -> CatalogEntity {
        let mut metadata = EntityMetadata::managed(&self.names.system, &self.portal_server_url);
        metadata.title = Some("Portal APIs".to_string());
        metadata.tags.push(PROVIDER_TAG.to_string());
        CatalogEntity::new(
            EntityKind::System,
            metadata,
            json!({ "owner": format!("user:{}", self.names.service_account) }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::SchemaDocument;
    use portico_core::entity::MANAGED_BY_LOCATION;
    use pretty_assertions::assert_eq;

    const LOCATION_KEY: &str = "portico-provider:test";

    fn builder() -> EntityMutationBuilder {
        let mut builder =
            EntityMutationBuilder::new(OwnershipNames::default(), LOCATION_KEY, "http://portal/v1");
        builder.set_apis_endpoint("http://portal/v1/apis?includeSchema=true");
        builder
    }

    #[test]
    fn empty_input_yields_the_three_organizational_entities() {
        let batch = builder().build(&[]);
        let kinds: Vec<EntityKind> = batch.entities.iter().map(|e| e.entity.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Group, EntityKind::User, EntityKind::System]);
        assert!(batch.entities.iter().all(|e| e.location_key == LOCATION_KEY));
        batch.validate().unwrap();
    }

    #[test]
    fn organizational_entities_reference_each_other() {
        let batch = builder().build(&[]);
        let group = &batch.entities[0].entity;
        let user = &batch.entities[1].entity;
        let system = &batch.entities[2].entity;

        assert_eq!(group.spec["members"][0], "portal-service-account");
        assert_eq!(user.spec["memberOf"][0], "portal-service-accounts");
        assert_eq!(system.spec["owner"], "user:portal-service-account");
        assert_eq!(
            group.metadata.annotations[MANAGED_BY_LOCATION],
            "url:http://portal/v1"
        );
    }

    #[test]
    fn api_entity_carries_tags_spec_and_location() {
        let mut record = ApiVersionRecord::new("Tracks API v1");
        record.display_title = "Tracks".into();
        record.description = "Track things".into();
        record.version_tag = Some("V1.0".into());
        record.product_id = Some("tracks".into());
        record.schema_document = Some(SchemaDocument::Text("openapi: 3.0.0".into()));

        let entity = builder().api_entity(&record);
        assert_eq!(entity.kind, EntityKind::Api);
        assert_eq!(entity.name(), "Tracks-API-v1");
        assert_eq!(entity.metadata.title.as_deref(), Some("Tracks"));
        assert_eq!(entity.metadata.description.as_deref(), Some("Track things"));
        assert_eq!(
            entity.metadata.tags,
            vec!["portal", "api-version:-1-0", "api-product:tracks"]
        );
        assert_eq!(
            entity.metadata.annotations[MANAGED_BY_LOCATION],
            "url:http://portal/v1/apis?includeSchema=true"
        );
        assert_eq!(entity.spec["type"], "openapi");
        assert_eq!(entity.spec["system"], "portal-apis");
        assert_eq!(entity.spec["owner"], "user:portal-service-account");
        assert_eq!(entity.spec["definition"], "openapi: 3.0.0");
    }

    #[test]
    fn json_schema_is_serialized_and_absent_schema_is_empty() {
        let mut with_json = ApiVersionRecord::new("a");
        with_json.schema_document = Some(SchemaDocument::Json(json!({"openapi": "3.1.0"})));
        let entity = builder().api_entity(&with_json);
        assert_eq!(entity.spec["definition"], r#"{"openapi":"3.1.0"}"#);

        let entity = builder().api_entity(&ApiVersionRecord::new("b"));
        assert_eq!(entity.spec["definition"], "");
        assert!(entity.metadata.description.is_none());
        assert_eq!(entity.metadata.tags, vec!["portal"]);
    }

    #[test]
    fn custom_metadata_becomes_annotations() {
        let mut record = ApiVersionRecord::new("a");
        record.custom_metadata.insert("team owner".into(), "zoo".into());
        record.usage_plans = vec!["gold".into(), "silver".into()];

        let entity = builder().api_entity(&record);
        assert_eq!(entity.metadata.annotations["portal.portico.dev/team-owner"], "zoo");
        assert_eq!(
            entity.metadata.annotations["portal.portico.dev/usage-plans"],
            "gold,silver"
        );
    }

    #[test]
    fn unusable_and_duplicate_names_are_skipped() {
        let records = [
            ApiVersionRecord::new("petstore"),
            ApiVersionRecord::new(""),
            ApiVersionRecord::new("petstore"),
            ApiVersionRecord::new("pet store"),
        ];
        let batch = builder().build(&records);
        assert_eq!(batch.names_of(EntityKind::Api), vec!["petstore", "pet-store"]);
        batch.validate().unwrap();
    }

    #[test]
    fn configured_names_are_sanitized() {
        let config = CatalogConfig {
            group_name: "Platform Team".into(),
            ..Default::default()
        };
        let names = OwnershipNames::from(&config);
        assert_eq!(names.group, "Platform-Team");
    }
}
