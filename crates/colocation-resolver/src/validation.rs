use crate::selector::{has_match_criteria, CompiledSelector};
use crate::{ResolverError, Result};
use colocation_core::{NodeScope, Strategy, StrategySet};

/// Reason a strategy or node scope was rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: String },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("nodeSelector has no match criteria")]
    EmptySelector,

    #[error("nodeSelector is invalid: {0}")]
    InvalidSelector(String),

    #[error("node scope does not override any field")]
    EmptyOverride,
}

fn check_positive(
    field: &'static str,
    value: Option<i64>,
) -> std::result::Result<(), ValidationError> {
    match value {
        Some(v) if v <= 0 => Err(ValidationError::NotPositive {
            field,
            value: v.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validate the set fields of a strategy
///
/// Unset fields are always accepted since they inherit from the strategy
/// they are applied to.
pub fn validate_strategy(strategy: &Strategy) -> std::result::Result<(), ValidationError> {
    check_positive(
        "metricAggregateDurationSeconds",
        strategy.metric_aggregate_duration_seconds,
    )?;
    check_positive(
        "metricReportIntervalSeconds",
        strategy.metric_report_interval_seconds,
    )?;
    check_positive(
        "cpuReclaimThresholdPercent",
        strategy.cpu_reclaim_threshold_percent,
    )?;
    check_positive(
        "memoryReclaimThresholdPercent",
        strategy.memory_reclaim_threshold_percent,
    )?;
    check_positive("degradeTimeMinutes", strategy.degrade_time_minutes)?;
    check_positive(
        "updateTimeThresholdSeconds",
        strategy.update_time_threshold_seconds,
    )?;

    if let Some(threshold) = strategy.resource_diff_threshold {
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(ValidationError::NotPositive {
                field: "resourceDiffThreshold",
                value: threshold.to_string(),
            });
        }
    }

    if let Some(policy) = &strategy.metric_aggregate_policy {
        if policy.durations.is_empty() {
            return Err(ValidationError::Empty {
                field: "metricAggregatePolicy.durations",
            });
        }
        if let Some(window) = policy.durations.iter().find(|w| w.is_zero()) {
            return Err(ValidationError::NotPositive {
                field: "metricAggregatePolicy.durations",
                value: format!("{:?}", window.as_duration()),
            });
        }
    }

    Ok(())
}

/// Boolean form of [`validate_strategy`]; a missing strategy is invalid
pub fn is_strategy_valid(strategy: Option<&Strategy>) -> bool {
    strategy.is_some_and(|s| validate_strategy(s).is_ok())
}

/// Validate a node scope as a unit: selector plus a non-empty override
pub fn validate_node_scope(scope: &NodeScope) -> std::result::Result<(), ValidationError> {
    if !has_match_criteria(&scope.node_selector) {
        return Err(ValidationError::EmptySelector);
    }

    CompiledSelector::compile(&scope.node_selector)
        .map_err(|e| ValidationError::InvalidSelector(e.to_string()))?;

    if scope.strategy.is_empty() {
        return Err(ValidationError::EmptyOverride);
    }

    Ok(())
}

/// Boolean form of [`validate_node_scope`]; a missing scope is invalid
pub fn is_node_scope_valid(scope: Option<&NodeScope>) -> bool {
    scope.is_some_and(|s| validate_node_scope(s).is_ok())
}

/// Validate a whole strategy set before it is published
///
/// Checks the base strategy, then every node scope and its override, and
/// reports the first problem found.
pub fn validate_strategy_set(set: &StrategySet) -> Result<()> {
    validate_strategy(&set.strategy).map_err(|e| {
        ResolverError::validation_failed(
            "strategy",
            e.to_string(),
            "Set numeric fields to positive values or leave them unset",
        )
    })?;

    for (index, scope) in set.node_configs.iter().enumerate() {
        let target = match &scope.name {
            Some(name) => format!("nodeConfigs[{}] ({})", index, name),
            None => format!("nodeConfigs[{}]", index),
        };

        validate_node_scope(scope).map_err(|e| {
            ResolverError::validation_failed(
                target.clone(),
                e.to_string(),
                "Each node config needs a non-empty nodeSelector and at least one overridden field",
            )
        })?;

        validate_strategy(&scope.strategy).map_err(|e| {
            ResolverError::validation_failed(
                target,
                e.to_string(),
                "Set numeric fields to positive values or leave them unset",
            )
        })?;
    }

    Ok(())
}
