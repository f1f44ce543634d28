use crate::merge::{FieldMerger, StrategyMerger};
use crate::selector::{LabelSelectorCompiler, SelectorCompiler};
use crate::types::{Resolution, SkipReason, SkippedScope};
use colocation_core::{NodeDescriptor, Strategy, StrategySet};
use tracing::{debug, warn};

/// Resolves the effective strategy of a node from a strategy set
///
/// Node scopes are scanned in declaration order. The first scope whose
/// selector matches and whose override merges cleanly is applied, and
/// scanning stops there. Scopes with an invalid selector or a failing merge
/// are skipped and recorded; if nothing applies the node gets a copy of the
/// base strategy.
pub struct StrategyResolver {
    compiler: Box<dyn SelectorCompiler>,
    merger: Box<dyn StrategyMerger>,
}

impl Default for StrategyResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyResolver {
    /// Create a resolver with label selector semantics and field merging
    pub fn new() -> Self {
        Self {
            compiler: Box::new(LabelSelectorCompiler),
            merger: Box::new(FieldMerger),
        }
    }

    /// Replace the selector compiler
    pub fn with_compiler(mut self, compiler: Box<dyn SelectorCompiler>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Replace the strategy merger
    pub fn with_merger(mut self, merger: Box<dyn StrategyMerger>) -> Self {
        self.merger = merger;
        self
    }

    /// Resolve the strategy for one node
    pub fn resolve(&self, set: &StrategySet, node: &NodeDescriptor) -> Resolution {
        let base = set.strategy.clone();
        let mut skipped = Vec::new();

        for (index, scope) in set.node_configs.iter().enumerate() {
            let scope_name = scope.name.as_deref().unwrap_or("unnamed");

            let matcher = match self.compiler.compile(&scope.node_selector) {
                Ok(matcher) => matcher,
                Err(e) => {
                    warn!(
                        "Skipping node scope {} ({}): {} rejected selector: {}",
                        index,
                        scope_name,
                        self.compiler.name(),
                        e
                    );
                    skipped.push(SkippedScope::new(
                        index,
                        scope.name.clone(),
                        SkipReason::SelectorInvalid(e.to_string()),
                    ));
                    continue;
                }
            };

            if !matcher.matches(node) {
                continue;
            }

            match self.merger.merge(&base, &scope.strategy) {
                Ok(merged) => {
                    debug!(
                        "Applied node scope {} ({}) to node {}",
                        index, scope_name, node
                    );
                    return Resolution::matched(merged, index, skipped);
                }
                Err(e) => {
                    warn!(
                        "Skipping node scope {} ({}): {} failed: {}",
                        index,
                        scope_name,
                        self.merger.name(),
                        e
                    );
                    skipped.push(SkippedScope::new(
                        index,
                        scope.name.clone(),
                        SkipReason::MergeFailed(e.to_string()),
                    ));
                }
            }
        }

        debug!("No node scope applied to node {}, using base strategy", node);
        Resolution::base(base, skipped)
    }
}

/// Resolve the strategy for a node with the default resolver
///
/// Returns `None` if either input is missing; otherwise always yields a
/// fully resolved strategy.
pub fn resolve_for_node(
    set: Option<&StrategySet>,
    node: Option<&NodeDescriptor>,
) -> Option<Strategy> {
    let (set, node) = (set?, node?);
    Some(StrategyResolver::new().resolve(set, node).into_strategy())
}
