use crate::Strategy;
use k8s_openapi::api::core::v1::Node;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Strategy override applied to the nodes matched by a label selector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeScope {
    /// Optional name used in logs and diagnostics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Nodes this override applies to
    #[serde(default)]
    pub node_selector: LabelSelector,

    /// Override fields, written inline next to the selector
    #[serde(flatten)]
    pub strategy: Strategy,
}

impl NodeScope {
    /// Create a scope selecting nodes by exact label matches
    pub fn new<K, V>(match_labels: impl IntoIterator<Item = (K, V)>, strategy: Strategy) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let labels: BTreeMap<String, String> = match_labels
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        Self {
            name: None,
            node_selector: LabelSelector {
                match_labels: Some(labels),
                match_expressions: None,
            },
            strategy,
        }
    }

    /// Create a scope from an arbitrary label selector
    pub fn with_selector(node_selector: LabelSelector, strategy: Strategy) -> Self {
        Self {
            name: None,
            node_selector,
            strategy,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A cluster-wide strategy plus ordered node-scoped overrides
///
/// Scope order is significant: when several scopes match a node, the first
/// one that applies cleanly wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySet {
    /// Base strategy, written inline at the top level
    #[serde(flatten)]
    pub strategy: Strategy,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_configs: Vec<NodeScope>,
}

impl StrategySet {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            node_configs: Vec::new(),
        }
    }

    /// Append a node scope after the existing ones
    pub fn with_node_scope(mut self, scope: NodeScope) -> Self {
        self.node_configs.push(scope);
        self
    }
}

/// Label set of the node a strategy is resolved for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeDescriptor {
    labels: BTreeMap<String, String>,
}

impl NodeDescriptor {
    pub fn new(labels: BTreeMap<String, String>) -> Self {
        Self { labels }
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.labels.contains_key(key)
    }
}

impl From<BTreeMap<String, String>> for NodeDescriptor {
    fn from(labels: BTreeMap<String, String>) -> Self {
        Self { labels }
    }
}

impl From<&Node> for NodeDescriptor {
    fn from(node: &Node) -> Self {
        Self {
            labels: node.metadata.labels.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Display for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .labels
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        write!(f, "{{{}}}", pairs.join(","))
    }
}
