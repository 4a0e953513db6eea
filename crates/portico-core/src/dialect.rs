//! Portal response dialects.
//!
//! A portal server answers discovery requests in one of two incompatible
//! shapes. The dialect is detected at runtime and remembered across sync
//! cycles so later cycles go straight to the right endpoint.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response shape spoken by a portal server.
///
/// ```text
/// unknown → grouped_by_product ⇄ flat_with_summaries
/// ```
///
/// Once a known dialect is established it never goes back to `Unknown`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum PortalDialect {
    /// Not yet detected.
    #[default]
    Unknown,
    /// Dialect A: `GET /apis?includeSchema=true`, optionally grouped by
    /// API product under `apiVersions`.
    GroupedByProduct,
    /// Dialect B: `GET /api-products` returns product summaries; versions
    /// are fetched per product.
    FlatWithSummaries,
}

impl PortalDialect {
    /// Return the string representation used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::GroupedByProduct => "grouped_by_product",
            Self::FlatWithSummaries => "flat_with_summaries",
        }
    }

    /// Whether this is one of the two known dialects.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// The other known dialect. `Unknown` maps to `GroupedByProduct`,
    /// which is probed first when nothing is known yet.
    #[must_use]
    pub const fn alternate(self) -> Self {
        match self {
            Self::GroupedByProduct => Self::FlatWithSummaries,
            Self::Unknown | Self::FlatWithSummaries => Self::GroupedByProduct,
        }
    }

    /// Path of the discovery endpoint relative to the portal base URL.
    #[must_use]
    pub const fn discovery_path(self) -> &'static str {
        match self {
            Self::Unknown | Self::GroupedByProduct => "/apis?includeSchema=true",
            Self::FlatWithSummaries => "/api-products",
        }
    }

    /// Absolute discovery URL for a (slash-stripped) portal base URL.
    #[must_use]
    pub fn discovery_url(self, base_url: &str) -> String {
        format!("{base_url}{}", self.discovery_path())
    }
}

impl fmt::Display for PortalDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
