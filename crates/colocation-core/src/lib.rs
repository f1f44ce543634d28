//! Colocation Core - Data model for node colocation strategies
//!
//! This crate provides:
//! - The sparse `Strategy` type and its policy enums
//! - Node scopes, strategy sets and node descriptors
//! - The canonical default strategy
//! - Error types with miette diagnostics
//! - JSON/YAML helpers for loading strategy sets

pub mod defaults;
pub mod error;
pub mod extender;
pub mod scope;
pub mod strategy;

// Re-export commonly used types
pub use defaults::{build_default_strategy, default_strategy_set};
pub use error::{ColocationError, Result};
pub use extender::Extender;
pub use scope::{NodeDescriptor, NodeScope, StrategySet};
pub use strategy::{
    AggregatePolicy, AggregateWindow, CalculatePolicy, MemoryCollectPolicy, Strategy,
};

// Re-export k8s-openapi types for convenience
pub use k8s_openapi;
pub use k8s_openapi::api::core::v1::Node;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};

use std::path::Path;

/// Serialize a value to JSON
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| {
        ColocationError::serialization_error(
            format!("Failed to serialize to JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Serialize a value to pretty JSON
pub fn to_json_pretty<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        ColocationError::serialization_error(
            format!("Failed to serialize to JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize a value from JSON
pub fn from_json<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<T> {
    serde_json::from_str(data).map_err(|e| {
        ColocationError::serialization_error(
            format!("Failed to deserialize from JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Serialize a value to YAML
pub fn to_yaml<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| {
        ColocationError::serialization_error(
            format!("Failed to serialize to YAML: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize a value from YAML
pub fn from_yaml<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<T> {
    serde_yaml::from_str(data).map_err(|e| {
        ColocationError::serialization_error(
            format!("Failed to deserialize from YAML: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Load a value from a `.json`, `.yaml` or `.yml` file
pub fn load_file<T: for<'de> serde::Deserialize<'de>>(path: &Path) -> Result<T> {
    let display = path.display().to_string();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let data = match extension.as_deref() {
        Some("json") | Some("yaml") | Some("yml") => {
            std::fs::read_to_string(path).map_err(|e| ColocationError::io_error(&display, e))?
        }
        _ => return Err(ColocationError::unsupported_format(display)),
    };

    if extension.as_deref() == Some("json") {
        from_json(&data)
    } else {
        from_yaml(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const STRATEGY_SET_YAML: &str = r#"
enable: false
cpuReclaimThresholdPercent: 60
metricAggregatePolicy:
  durations: ["5m", "10m", "30m"]
nodeConfigs:
  - name: us-east
    nodeSelector:
      matchLabels:
        zone: us-east
    enable: true
    cpuReclaimThresholdPercent: 80
  - nodeSelector:
      matchExpressions:
        - key: pool
          operator: In
          values: ["batch"]
    extensions:
      batchCpu:
        maxRatio: 40
"#;

    #[test]
    fn test_json_serialization() {
        let set = default_strategy_set();

        let json = to_json(&set).unwrap();
        assert!(json.contains("cpuReclaimThresholdPercent"));

        let deserialized: StrategySet = from_json(&json).unwrap();
        assert_eq!(deserialized, set);
    }

    #[test]
    fn test_yaml_strategy_set() {
        let set: StrategySet = from_yaml(STRATEGY_SET_YAML).unwrap();

        assert_eq!(set.strategy.enable, Some(false));
        assert_eq!(set.strategy.cpu_reclaim_threshold_percent, Some(60));
        assert_eq!(set.node_configs.len(), 2);
        assert_eq!(set.node_configs[0].name.as_deref(), Some("us-east"));
        assert_eq!(set.node_configs[0].strategy.enable, Some(true));
        assert_eq!(
            set.node_configs[0].strategy.cpu_reclaim_threshold_percent,
            Some(80)
        );
        assert!(set.node_configs[1].strategy.extensions.contains_key("batchCpu"));

        let requirement = &set.node_configs[1]
            .node_selector
            .match_expressions
            .as_ref()
            .unwrap()[0];
        assert_eq!(requirement.operator, "In");
    }

    #[test]
    fn test_invalid_yaml() {
        let result: Result<StrategySet> = from_yaml("cpuReclaimThresholdPercent: [1, 2]");
        assert!(matches!(
            result,
            Err(ColocationError::SerializationError { .. })
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(STRATEGY_SET_YAML.as_bytes()).unwrap();

        let set: StrategySet = load_file(file.path()).unwrap();
        assert_eq!(set.node_configs.len(), 2);

        let mut json_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json_file
            .write_all(to_json(&set).unwrap().as_bytes())
            .unwrap();
        let reloaded: StrategySet = load_file(json_file.path()).unwrap();
        assert_eq!(reloaded, set);
    }

    #[test]
    fn test_load_file_unsupported() {
        let file = NamedTempFile::new().unwrap();
        let result: Result<StrategySet> = load_file(file.path());
        assert!(matches!(
            result,
            Err(ColocationError::UnsupportedFormat { .. })
        ));

        let result: Result<StrategySet> = load_file(Path::new("/nonexistent/colocation.yaml"));
        assert!(matches!(result, Err(ColocationError::IoError { .. })));
    }
}
