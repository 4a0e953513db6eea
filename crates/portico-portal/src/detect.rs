//! Response dialect detection.
//!
//! Classification keys off fields that only one dialect ever sends on its
//! discovery payload:
//!
//! | first element has                          | dialect               |
//! |--------------------------------------------|-----------------------|
//! | `apiVersions`, `apiProductId` or `apiId`   | `GroupedByProduct`    |
//! | `id` and none of the above                 | `FlatWithSummaries`   |
//! | anything else, empty array, non-array      | `Unknown`             |
//!
//! Optional fields such as `versionsCount` are ignored.

use portico_core::PortalDialect;
use serde_json::Value;

const GROUPED_MARKERS: [&str; 3] = ["apiVersions", "apiProductId", "apiId"];

/// Classify a raw discovery response. Pure; no I/O.
#[must_use]
pub fn classify(response: &Value) -> PortalDialect {
    let Some(first) = response.as_array().and_then(|items| items.first()) else {
        return PortalDialect::Unknown;
    };
    let Some(fields) = first.as_object() else {
        return PortalDialect::Unknown;
    };
    if GROUPED_MARKERS.iter().any(|key| fields.contains_key(*key)) {
        PortalDialect::GroupedByProduct
    } else if fields.contains_key("id") {
        PortalDialect::FlatWithSummaries
    } else {
        PortalDialect::Unknown
    }
}

/// Whether the response is an array with no elements.
#[must_use]
pub fn is_empty_listing(response: &Value) -> bool {
    response.as_array().is_some_and(Vec::is_empty)
}
