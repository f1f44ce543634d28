use colocation_core::Strategy;
use std::fmt;

/// Why a node scope was passed over during resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The selector could not be compiled
    SelectorInvalid(String),
    /// The selector matched but the override could not be merged
    MergeFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectorInvalid(reason) => write!(f, "selector invalid: {}", reason),
            Self::MergeFailed(reason) => write!(f, "merge failed: {}", reason),
        }
    }
}

/// A node scope that was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedScope {
    /// Position in the strategy set
    pub index: usize,
    /// Scope name, if any
    pub name: Option<String>,
    pub reason: SkipReason,
}

impl SkippedScope {
    pub fn new(index: usize, name: Option<String>, reason: SkipReason) -> Self {
        Self {
            index,
            name,
            reason,
        }
    }
}

/// Outcome of resolving a strategy for one node
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Effective strategy for the node
    pub strategy: Strategy,
    /// Index of the node scope that was applied
    pub applied: Option<usize>,
    /// Scopes passed over before the applied one (or all of them)
    pub skipped: Vec<SkippedScope>,
}

impl Resolution {
    /// Resolution that fell back to the base strategy
    pub fn base(strategy: Strategy, skipped: Vec<SkippedScope>) -> Self {
        Self {
            strategy,
            applied: None,
            skipped,
        }
    }

    /// Resolution where the scope at `index` was applied
    pub fn matched(strategy: Strategy, index: usize, skipped: Vec<SkippedScope>) -> Self {
        Self {
            strategy,
            applied: Some(index),
            skipped,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.applied.is_some()
    }

    pub fn into_strategy(self) -> Strategy {
        self.strategy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_constructors() {
        let base = Resolution::base(Strategy::new(), vec![]);
        assert!(!base.is_matched());

        let skipped = SkippedScope::new(
            0,
            Some("gpu".to_string()),
            SkipReason::SelectorInvalid("unsupported operator 'Gt'".to_string()),
        );
        let matched = Resolution::matched(Strategy::new().with_enable(true), 1, vec![skipped]);
        assert!(matched.is_matched());
        assert_eq!(matched.applied, Some(1));
        assert!(matched.skipped[0].reason.to_string().starts_with("selector invalid"));
        assert_eq!(matched.into_strategy().enable, Some(true));
    }
}
