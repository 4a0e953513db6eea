//! Normalized API-version records.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An API schema document as delivered by the portal.
///
/// Portals either inline the document as a string (YAML or JSON text) or
/// as an already-parsed JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SchemaDocument {
    Text(String),
    Json(serde_json::Value),
}

impl SchemaDocument {
    /// Build from a raw JSON value. `null` and empty strings mean "absent".
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(Self::Text(s)),
            other => Some(Self::Json(other)),
        }
    }

    /// Render as the text stored in a catalog API definition.
    #[must_use]
    pub fn to_definition(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Json(value) => value.to_string(),
        }
    }
}

/// One API version, normalized from either portal dialect.
///
/// Built fresh each sync cycle and consumed by the mutation builder.
/// `id` always comes from the dialect-specific identifier field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ApiVersionRecord {
    pub id: String,
    pub display_title: String,
    pub description: String,
    pub schema_document: Option<SchemaDocument>,
    pub version_tag: Option<String>,
    pub product_description: Option<String>,
    pub product_id: Option<String>,
    pub product_display_name: Option<String>,
    #[serde(default)]
    pub custom_metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub usage_plans: Vec<String>,
}

impl ApiVersionRecord {
    /// Minimal record with `display_title` defaulting to the id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_title: id.clone(),
            id,
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn has_schema(&self) -> bool {
        self.schema_document.is_some()
    }
}
