use crate::Extender;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How node memory usage is collected for metric reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemoryCollectPolicy {
    /// Usage excluding the page cache
    UsageWithoutPageCache,
    /// Usage including only the hot part of the page cache
    UsageWithHotPageCache,
    /// Usage including the whole page cache
    UsageWithPageCache,
}

impl fmt::Display for MemoryCollectPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::UsageWithoutPageCache => "usageWithoutPageCache",
            Self::UsageWithHotPageCache => "usageWithHotPageCache",
            Self::UsageWithPageCache => "usageWithPageCache",
        };
        f.write_str(s)
    }
}

/// How reclaimable memory is calculated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalculatePolicy {
    /// Based on pod usage
    Usage,
    /// Based on pod requests
    Request,
    /// Based on the larger of usage and request
    MaxUsageRequest,
}

impl fmt::Display for CalculatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Usage => "usage",
            Self::Request => "request",
            Self::MaxUsageRequest => "maxUsageRequest",
        };
        f.write_str(s)
    }
}

/// A single rolling aggregation window (e.g. "5m")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateWindow(#[serde(with = "humantime_serde")] pub Duration);

impl AggregateWindow {
    pub fn from_mins(mins: u64) -> Self {
        Self(Duration::from_secs(mins * 60))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Duration> for AggregateWindow {
    fn from(d: Duration) -> Self {
        Self(d)
    }
}

/// Rolling windows used to aggregate node metrics
///
/// Merged as a unit: an override that sets this replaces the whole window list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatePolicy {
    #[serde(default)]
    pub durations: Vec<AggregateWindow>,
}

impl AggregatePolicy {
    pub fn new(durations: impl IntoIterator<Item = AggregateWindow>) -> Self {
        Self {
            durations: durations.into_iter().collect(),
        }
    }
}

/// Colocation strategy
///
/// Every field is optional. `None` means "no opinion": when a strategy is
/// applied on top of another one, unset fields inherit the value underneath.
/// A present `false` or `0` is an explicit value and is not inherited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    /// Whether colocation is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_aggregate_duration_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_report_interval_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_aggregate_policy: Option<AggregatePolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_memory_collect_policy: Option<MemoryCollectPolicy>,

    /// Share of node CPU that may be reclaimed for batch workloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_reclaim_threshold_percent: Option<i64>,

    /// Share of node memory that may be reclaimed for batch workloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_reclaim_threshold_percent: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_calculate_policy: Option<CalculatePolicy>,

    /// Minutes without fresh metrics before batch resources are degraded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degrade_time_minutes: Option<i64>,

    /// Force an update of batch resources after this many seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time_threshold_seconds: Option<i64>,

    /// Relative change that triggers a recompute of batch resources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_diff_threshold: Option<f64>,

    #[serde(default, skip_serializing_if = "Extender::is_empty")]
    pub extensions: Extender,
}

impl Strategy {
    /// Create an empty strategy (every field unset)
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no field is set, i.e. the strategy changes nothing when applied
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn with_enable(mut self, enable: bool) -> Self {
        self.enable = Some(enable);
        self
    }

    pub fn with_cpu_reclaim_threshold_percent(mut self, percent: i64) -> Self {
        self.cpu_reclaim_threshold_percent = Some(percent);
        self
    }

    pub fn with_memory_reclaim_threshold_percent(mut self, percent: i64) -> Self {
        self.memory_reclaim_threshold_percent = Some(percent);
        self
    }

    pub fn with_degrade_time_minutes(mut self, minutes: i64) -> Self {
        self.degrade_time_minutes = Some(minutes);
        self
    }

    pub fn with_resource_diff_threshold(mut self, threshold: f64) -> Self {
        self.resource_diff_threshold = Some(threshold);
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extensions.insert(key, value);
        self
    }
}
