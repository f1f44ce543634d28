//! Colocation Resolver - Per-node strategy resolution
//!
//! This crate provides:
//! - Label selector compilation and matching
//! - Strategy and node scope validation
//! - Field-by-field strategy merging
//! - First-match resolution over ordered node scopes
//! - A copy-on-publish store for the active strategy set

pub mod error;
pub mod merge;
pub mod resolver;
pub mod selector;
pub mod store;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{ResolverError, Result};
pub use merge::{merge_strategies, FieldMerger, StrategyMerger};
pub use resolver::{resolve_for_node, StrategyResolver};
pub use selector::{CompiledSelector, LabelMatcher, LabelSelectorCompiler, SelectorCompiler};
pub use store::StrategyStore;
pub use types::{Resolution, SkipReason, SkippedScope};
pub use validation::{
    is_node_scope_valid, is_strategy_valid, validate_node_scope, validate_strategy,
    validate_strategy_set, ValidationError,
};
