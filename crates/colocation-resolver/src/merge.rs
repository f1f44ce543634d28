use crate::Result;
use colocation_core::{Extender, Strategy};
use tracing::debug;

/// Merges an override strategy onto a base strategy
pub trait StrategyMerger: Send + Sync {
    /// Produce a new strategy; neither input is modified
    fn merge(&self, base: &Strategy, overlay: &Strategy) -> Result<Strategy>;

    /// Name of the merger
    fn name(&self) -> &str;
}

/// Field-by-field merge: a set override field replaces the base value, an
/// unset one keeps it. Extensions are merged key by key.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMerger;

impl StrategyMerger for FieldMerger {
    fn merge(&self, base: &Strategy, overlay: &Strategy) -> Result<Strategy> {
        let extensions = merge_extensions(&base.extensions, &overlay.extensions)?;

        Ok(Strategy {
            enable: pick(&base.enable, &overlay.enable),
            metric_aggregate_duration_seconds: pick(
                &base.metric_aggregate_duration_seconds,
                &overlay.metric_aggregate_duration_seconds,
            ),
            metric_report_interval_seconds: pick(
                &base.metric_report_interval_seconds,
                &overlay.metric_report_interval_seconds,
            ),
            metric_aggregate_policy: pick(
                &base.metric_aggregate_policy,
                &overlay.metric_aggregate_policy,
            ),
            metric_memory_collect_policy: pick(
                &base.metric_memory_collect_policy,
                &overlay.metric_memory_collect_policy,
            ),
            cpu_reclaim_threshold_percent: pick(
                &base.cpu_reclaim_threshold_percent,
                &overlay.cpu_reclaim_threshold_percent,
            ),
            memory_reclaim_threshold_percent: pick(
                &base.memory_reclaim_threshold_percent,
                &overlay.memory_reclaim_threshold_percent,
            ),
            memory_calculate_policy: pick(
                &base.memory_calculate_policy,
                &overlay.memory_calculate_policy,
            ),
            degrade_time_minutes: pick(&base.degrade_time_minutes, &overlay.degrade_time_minutes),
            update_time_threshold_seconds: pick(
                &base.update_time_threshold_seconds,
                &overlay.update_time_threshold_seconds,
            ),
            resource_diff_threshold: pick(
                &base.resource_diff_threshold,
                &overlay.resource_diff_threshold,
            ),
            extensions,
        })
    }

    fn name(&self) -> &str {
        "FieldMerger"
    }
}

fn pick<T: Clone>(base: &Option<T>, overlay: &Option<T>) -> Option<T> {
    overlay.as_ref().or(base.as_ref()).cloned()
}

/// Merge extension maps key by key
///
/// Override keys replace or add entries whatever their JSON type; base-only
/// keys are kept.
pub fn merge_extensions(base: &Extender, overlay: &Extender) -> Result<Extender> {
    let mut merged = base.clone();

    for (key, value) in overlay.iter() {
        debug!("Overriding extension {}", key);
        merged.insert(key.clone(), value.clone());
    }

    Ok(merged)
}

/// Merge with the default [`FieldMerger`]
pub fn merge_strategies(base: &Strategy, overlay: &Strategy) -> Result<Strategy> {
    FieldMerger.merge(base, overlay)
}
