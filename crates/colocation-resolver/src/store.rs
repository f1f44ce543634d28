use crate::resolver::StrategyResolver;
use crate::types::Resolution;
use crate::validation::validate_strategy_set;
use crate::Result;
use colocation_core::{default_strategy_set, NodeDescriptor, StrategySet};
use std::sync::Arc;
use tracing::{info, warn};

/// Holds the currently published strategy set
///
/// A published set is never modified. `publish` swaps in a new set
/// atomically; readers holding an earlier snapshot keep resolving against it.
pub struct StrategyStore {
    current: parking_lot::RwLock<Arc<StrategySet>>,
    resolver: StrategyResolver,
}

impl Default for StrategyStore {
    fn default() -> Self {
        Self::new(StrategyResolver::new())
    }
}

impl StrategyStore {
    /// Create a store holding the default strategy set
    pub fn new(resolver: StrategyResolver) -> Self {
        Self {
            current: parking_lot::RwLock::new(Arc::new(default_strategy_set())),
            resolver,
        }
    }

    /// Validate and publish a new strategy set
    ///
    /// An invalid set is rejected and the previous one stays in place.
    pub fn publish(&self, set: StrategySet) -> Result<()> {
        if let Err(e) = validate_strategy_set(&set) {
            warn!("Rejected strategy set: {}", e);
            return Err(e);
        }

        let scopes = set.node_configs.len();
        *self.current.write() = Arc::new(set);
        info!("Published strategy set with {} node scopes", scopes);

        Ok(())
    }

    /// Current strategy set
    pub fn snapshot(&self) -> Arc<StrategySet> {
        self.current.read().clone()
    }

    /// Resolve a node against the current strategy set
    pub fn resolve(&self, node: &NodeDescriptor) -> Resolution {
        let set = self.snapshot();
        self.resolver.resolve(&set, node)
    }
}
