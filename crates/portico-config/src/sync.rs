//! Sync cadence configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Sync frequency used when none (or zero) is configured.
pub const DEFAULT_FREQUENCY: Duration = Duration::from_secs(5 * 60);

/// Per-cycle timeout used when none (or zero) is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A duration written as optional `hours`, `minutes`, `seconds` and
/// `milliseconds` parts that are summed.
///
/// ```toml
/// frequency = { minutes = 1, seconds = 30 }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DurationSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milliseconds: Option<u64>,
}

impl DurationSpec {
    /// Sum of all parts. Saturates instead of overflowing.
    #[must_use]
    pub fn total(&self) -> Duration {
        let millis = self
            .hours
            .unwrap_or(0)
            .saturating_mul(3_600_000)
            .saturating_add(self.minutes.unwrap_or(0).saturating_mul(60_000))
            .saturating_add(self.seconds.unwrap_or(0).saturating_mul(1_000))
            .saturating_add(self.milliseconds.unwrap_or(0));
        Duration::from_millis(millis)
    }

    /// The summed duration, or `default` when every part is zero or absent.
    #[must_use]
    pub fn to_duration_or(&self, default: Duration) -> Duration {
        let total = self.total();
        if total.is_zero() { default } else { total }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Interval between sync cycles.
    #[serde(default)]
    pub frequency: DurationSpec,

    /// Upper bound on a single sync cycle.
    #[serde(default)]
    pub timeout: DurationSpec,
}

impl SyncConfig {
    #[must_use]
    pub fn frequency(&self) -> Duration {
        self.frequency.to_duration_or(DEFAULT_FREQUENCY)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout.to_duration_or(DEFAULT_TIMEOUT)
    }
}
