use crate::{
    AggregatePolicy, AggregateWindow, CalculatePolicy, Extender, MemoryCollectPolicy, Strategy,
    StrategySet,
};

pub const DEFAULT_METRIC_AGGREGATE_DURATION_SECONDS: i64 = 300;
pub const DEFAULT_METRIC_REPORT_INTERVAL_SECONDS: i64 = 60;
pub const DEFAULT_AGGREGATE_WINDOW_MINUTES: [u64; 3] = [5, 10, 30];
pub const DEFAULT_CPU_RECLAIM_THRESHOLD_PERCENT: i64 = 60;
pub const DEFAULT_MEMORY_RECLAIM_THRESHOLD_PERCENT: i64 = 65;
pub const DEFAULT_DEGRADE_TIME_MINUTES: i64 = 15;
pub const DEFAULT_UPDATE_TIME_THRESHOLD_SECONDS: i64 = 300;
pub const DEFAULT_RESOURCE_DIFF_THRESHOLD: f64 = 0.1;

/// Build the fully populated default strategy
///
/// Colocation is disabled, but every other knob carries a usable value so
/// that enabling it on a subset of nodes only needs `enable: true`.
pub fn build_default_strategy() -> Strategy {
    Strategy {
        enable: Some(false),
        metric_aggregate_duration_seconds: Some(DEFAULT_METRIC_AGGREGATE_DURATION_SECONDS),
        metric_report_interval_seconds: Some(DEFAULT_METRIC_REPORT_INTERVAL_SECONDS),
        metric_aggregate_policy: Some(AggregatePolicy::new(
            DEFAULT_AGGREGATE_WINDOW_MINUTES
                .iter()
                .map(|m| AggregateWindow::from_mins(*m)),
        )),
        metric_memory_collect_policy: Some(MemoryCollectPolicy::UsageWithoutPageCache),
        cpu_reclaim_threshold_percent: Some(DEFAULT_CPU_RECLAIM_THRESHOLD_PERCENT),
        memory_reclaim_threshold_percent: Some(DEFAULT_MEMORY_RECLAIM_THRESHOLD_PERCENT),
        memory_calculate_policy: Some(CalculatePolicy::Usage),
        degrade_time_minutes: Some(DEFAULT_DEGRADE_TIME_MINUTES),
        update_time_threshold_seconds: Some(DEFAULT_UPDATE_TIME_THRESHOLD_SECONDS),
        resource_diff_threshold: Some(DEFAULT_RESOURCE_DIFF_THRESHOLD),
        extensions: Extender::new(),
    }
}

/// Default strategy with no node scopes
pub fn default_strategy_set() -> StrategySet {
    StrategySet::new(build_default_strategy())
}
