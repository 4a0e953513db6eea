//! Catalog entity envelopes and mutation batches.
//!
//! The wire shape follows the `backstage.io/v1alpha1` descriptor format:
//! `apiVersion`, `kind`, `metadata`, `spec`. `spec` is kind-specific and kept
//! as raw JSON.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;

/// Descriptor format version stamped on every entity.
pub const ENTITY_API_VERSION: &str = "backstage.io/v1alpha1";

/// Annotation naming the location that manages an entity.
pub const MANAGED_BY_LOCATION: &str = "backstage.io/managed-by-location";

/// Annotation naming the location an entity originated from.
pub const MANAGED_BY_ORIGIN_LOCATION: &str = "backstage.io/managed-by-origin-location";

/// Kind tag of a catalog entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum EntityKind {
    #[serde(rename = "API")]
    Api,
    Group,
    User,
    System,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "API",
            Self::Group => "Group",
            Self::User => "User",
            Self::System => "System",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity metadata block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntityMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl EntityMetadata {
    /// Metadata with both managed-by annotations pointing at `location_url`.
    #[must_use]
    pub fn managed(name: impl Into<String>, location_url: &str) -> Self {
        let location = format!("url:{location_url}");
        let mut annotations = BTreeMap::new();
        annotations.insert(MANAGED_BY_LOCATION.to_string(), location.clone());
        annotations.insert(MANAGED_BY_ORIGIN_LOCATION.to_string(), location);
        Self {
            name: name.into(),
            annotations,
            ..Default::default()
        }
    }
}

/// A single catalog entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntity {
    pub api_version: String,
    pub kind: EntityKind,
    pub metadata: EntityMetadata,
    pub spec: serde_json::Value,
}

impl CatalogEntity {
    #[must_use]
    pub fn new(kind: EntityKind, metadata: EntityMetadata, spec: serde_json::Value) -> Self {
        Self {
            api_version: ENTITY_API_VERSION.to_string(),
            kind,
            metadata,
            spec,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// An entity paired with the location key that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocatedEntity {
    pub location_key: String,
    pub entity: CatalogEntity,
}

/// Mutation semantics understood by the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    /// Replace every entity previously reported under the same location key.
    #[default]
    Full,
}

/// A complete replacement set of catalog entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MutationBatch {
    #[serde(rename = "type")]
    pub mutation_type: MutationType,
    pub entities: Vec<LocatedEntity>,
}

impl MutationBatch {
    /// Build a `full` batch with every entity under `location_key`.
    #[must_use]
    pub fn full(location_key: &str, entities: impl IntoIterator<Item = CatalogEntity>) -> Self {
        Self {
            mutation_type: MutationType::Full,
            entities: entities
                .into_iter()
                .map(|entity| LocatedEntity {
                    location_key: location_key.to_string(),
                    entity,
                })
                .collect(),
        }
    }

    /// Number of entities of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.entities.iter().filter(|e| e.entity.kind == kind).count()
    }

    /// Check the ownership invariants: one shared location key and no
    /// entity without a name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] naming the first offending entity.
    pub fn validate(&self) -> Result<(), CoreError> {
        let Some(first) = self.entities.first() else {
            return Ok(());
        };
        for located in &self.entities {
            if located.location_key != first.location_key {
                return Err(CoreError::Validation(format!(
                    "{} '{}' has location key '{}', expected '{}'",
                    located.entity.kind,
                    located.entity.name(),
                    located.location_key,
                    first.location_key,
                )));
            }
            if located.entity.name().is_empty() {
                return Err(CoreError::Validation(format!(
                    "{} entity has an empty name",
                    located.entity.kind
                )));
            }
        }
        Ok(())
    }

    /// Names of all entities of the given kind, in batch order.
    #[must_use]
    pub fn names_of(&self, kind: EntityKind) -> Vec<&str> {
        self.entities
            .iter()
            .filter(|e| e.entity.kind == kind)
            .map(|e| e.entity.name())
            .collect()
    }
}
