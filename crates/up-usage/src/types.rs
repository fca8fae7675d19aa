//! Core types for usage queries.
//!
//! - [`UsageEvent`] — One usage measurement for a control plane resource kind
//! - [`UsageQuery`] — Lexical key range over the partitioned store
//! - [`UsageWindow`] — One step of a windowed query

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A usage measurement for one custom resource group/version/kind on a
/// managed control plane, covering `[timestamp, timestamp_end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// Measurement name, e.g. `max_resource_count_per_gvk_per_mcp`.
    pub name: String,
    /// Dimensions identifying what was measured.
    pub tags: EventTags,
    /// Start of the measurement interval.
    pub timestamp: DateTime<Utc>,
    /// End of the measurement interval.
    pub timestamp_end: DateTime<Utc>,
    /// Measured value.
    pub value: f64,
}

/// Dimensions attached to a [`UsageEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTags {
    /// API group of the custom resource.
    #[serde(rename = "customresource_group")]
    pub group: String,
    /// API version of the custom resource.
    #[serde(rename = "customresource_version")]
    pub version: String,
    /// Kind of the custom resource.
    #[serde(rename = "customresource_kind")]
    pub kind: String,
    /// Organization account owning the control plane.
    #[serde(rename = "upbound_account")]
    pub account: String,
    /// Managed control plane identifier.
    pub mcp_id: String,
}

/// A range scan over object keys: `start_offset <= key < end_offset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsageQuery {
    /// Inclusive lower bound.
    pub start_offset: String,
    /// Exclusive upper bound.
    pub end_offset: String,
}

impl UsageQuery {
    /// Checks if an object key falls within this query.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        key >= self.start_offset.as_str() && key < self.end_offset.as_str()
    }
}

/// One step produced by [`crate::UsageQueryIterator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageWindow {
    /// Key range covering this window.
    pub query: UsageQuery,
    /// Start of the window (inclusive, hour-aligned).
    pub start: DateTime<Utc>,
    /// End of the window (exclusive, hour-aligned).
    pub end: DateTime<Utc>,
}
