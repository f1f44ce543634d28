use crate::{ResolverError, Result};
use colocation_core::{LabelSelector, NodeDescriptor};
use std::collections::BTreeSet;
use std::fmt;

/// Compiled label predicate
pub trait LabelMatcher: Send + Sync {
    /// Test a node's labels against this matcher
    fn matches(&self, node: &NodeDescriptor) -> bool;
}

/// Turns a label selector into a matcher
pub trait SelectorCompiler: Send + Sync {
    /// Compile a selector; failure means the selector can never be evaluated
    fn compile(&self, selector: &LabelSelector) -> Result<Box<dyn LabelMatcher>>;

    /// Name of the compiler
    fn name(&self) -> &str;
}

/// True if the selector carries at least one label or expression
pub fn has_match_criteria(selector: &LabelSelector) -> bool {
    let labels = selector.match_labels.as_ref().map_or(0, |l| l.len());
    let expressions = selector.match_expressions.as_ref().map_or(0, |e| e.len());
    labels + expressions > 0
}

/// Selector operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

impl Operator {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "In" => Ok(Self::In),
            "NotIn" => Ok(Self::NotIn),
            "Exists" => Ok(Self::Exists),
            "DoesNotExist" => Ok(Self::DoesNotExist),
            other => Err(ResolverError::invalid_selector(format!(
                "unsupported operator '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::In => "In",
            Self::NotIn => "NotIn",
            Self::Exists => "Exists",
            Self::DoesNotExist => "DoesNotExist",
        };
        f.write_str(s)
    }
}

/// One compiled criterion of a selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    key: String,
    operator: Operator,
    values: BTreeSet<String>,
}

impl Requirement {
    /// Build and validate a requirement
    pub fn new(
        key: impl Into<String>,
        operator: Operator,
        values: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let key = key.into();
        if !is_valid_label_key(&key) {
            return Err(ResolverError::invalid_selector(format!(
                "invalid label key '{}'",
                key
            )));
        }

        let values: BTreeSet<String> = values.into_iter().collect();
        match operator {
            Operator::In | Operator::NotIn => {
                if values.is_empty() {
                    return Err(ResolverError::invalid_selector(format!(
                        "operator {} on key '{}' requires at least one value",
                        operator, key
                    )));
                }
            }
            Operator::Exists | Operator::DoesNotExist => {
                if !values.is_empty() {
                    return Err(ResolverError::invalid_selector(format!(
                        "operator {} on key '{}' must not have values",
                        operator, key
                    )));
                }
            }
        }

        if let Some(bad) = values.iter().find(|v| !is_valid_label_value(v)) {
            return Err(ResolverError::invalid_selector(format!(
                "invalid label value '{}' for key '{}'",
                bad, key
            )));
        }

        Ok(Self {
            key,
            operator,
            values,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Check this requirement against a node's labels
    pub fn matches(&self, node: &NodeDescriptor) -> bool {
        match self.operator {
            Operator::In => node
                .get(&self.key)
                .is_some_and(|v| self.values.contains(v)),
            Operator::NotIn => node
                .get(&self.key)
                .is_none_or(|v| !self.values.contains(v)),
            Operator::Exists => node.contains_key(&self.key),
            Operator::DoesNotExist => !node.contains_key(&self.key),
        }
    }
}

/// Conjunction of requirements; empty means "match everything"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledSelector {
    requirements: Vec<Requirement>,
}

impl CompiledSelector {
    /// Compile a Kubernetes label selector
    pub fn compile(selector: &LabelSelector) -> Result<Self> {
        let mut requirements = Vec::new();

        if let Some(labels) = &selector.match_labels {
            for (key, value) in labels {
                requirements.push(Requirement::new(
                    key.clone(),
                    Operator::In,
                    [value.clone()],
                )?);
            }
        }

        if let Some(expressions) = &selector.match_expressions {
            for expr in expressions {
                let operator = Operator::parse(&expr.operator)?;
                requirements.push(Requirement::new(
                    expr.key.clone(),
                    operator,
                    expr.values.clone().unwrap_or_default(),
                )?);
            }
        }

        requirements.sort_by(|a, b| a.key.cmp(&b.key));

        Ok(Self { requirements })
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

impl LabelMatcher for CompiledSelector {
    fn matches(&self, node: &NodeDescriptor) -> bool {
        self.requirements.iter().all(|r| r.matches(node))
    }
}

/// Compiler with Kubernetes label selector semantics
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelSelectorCompiler;

impl SelectorCompiler for LabelSelectorCompiler {
    fn compile(&self, selector: &LabelSelector) -> Result<Box<dyn LabelMatcher>> {
        Ok(Box::new(CompiledSelector::compile(selector)?))
    }

    fn name(&self) -> &str {
        "LabelSelectorCompiler"
    }
}

/// Validate a label key: optional DNS subdomain prefix, then a name segment
pub fn is_valid_label_key(key: &str) -> bool {
    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    if let Some(prefix) = prefix {
        if !is_dns_subdomain(prefix) {
            return false;
        }
    }

    !name.is_empty() && is_label_segment(name)
}

/// Validate a label value: empty, or a name segment
pub fn is_valid_label_value(value: &str) -> bool {
    value.is_empty() || is_label_segment(value)
}

fn is_label_segment(s: &str) -> bool {
    if s.is_empty() || s.len() > 63 {
        return false;
    }

    let bytes = s.as_bytes();
    if !bytes[0].is_ascii_alphanumeric() || !bytes[bytes.len() - 1].is_ascii_alphanumeric() {
        return false;
    }

    bytes
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

fn is_dns_subdomain(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    s.split('.').all(|part| {
        let bytes = part.as_bytes();
        !bytes.is_empty()
            && bytes.len() <= 63
            && bytes[0].is_ascii_alphanumeric()
            && bytes[bytes.len() - 1].is_ascii_alphanumeric()
            && bytes
                .iter()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use colocation_core::LabelSelectorRequirement;
    use std::collections::BTreeMap;

    fn expr(key: &str, operator: &str, values: &[&str]) -> LabelSelectorRequirement {
        LabelSelectorRequirement {
            key: key.to_string(),
            operator: operator.to_string(),
            values: if values.is_empty() {
                None
            } else {
                Some(values.iter().map(|v| v.to_string()).collect())
            },
        }
    }

    fn selector(
        labels: &[(&str, &str)],
        expressions: Vec<LabelSelectorRequirement>,
    ) -> LabelSelector {
        LabelSelector {
            match_labels: if labels.is_empty() {
                None
            } else {
                Some(
                    labels
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect::<BTreeMap<_, _>>(),
                )
            },
            match_expressions: if expressions.is_empty() {
                None
            } else {
                Some(expressions)
            },
        }
    }

    fn node(labels: &[(&str, &str)]) -> NodeDescriptor {
        labels
            .iter()
            .fold(NodeDescriptor::default(), |n, (k, v)| n.with_label(*k, *v))
    }

    fn matches(sel: &LabelSelector, n: &NodeDescriptor) -> bool {
        LabelSelectorCompiler.compile(sel).unwrap().matches(n)
    }

    #[test]
    fn test_match_labels_equality() {
        let sel = selector(&[("zone", "us-east")], vec![]);
        assert!(matches(&sel, &node(&[("zone", "us-east"), ("pool", "batch")])));
        assert!(!matches(&sel, &node(&[("zone", "us-west")])));
        assert!(!matches(&sel, &node(&[])));
    }

    #[test]
    fn test_all_criteria_must_hold() {
        let sel = selector(
            &[("zone", "us-east")],
            vec![expr("pool", "In", &["batch", "mixed"])],
        );
        assert!(matches(&sel, &node(&[("zone", "us-east"), ("pool", "mixed")])));
        assert!(!matches(&sel, &node(&[("zone", "us-east"), ("pool", "online")])));
        assert!(!matches(&sel, &node(&[("pool", "batch")])));
    }

    #[test]
    fn test_set_operators() {
        let not_in = selector(&[], vec![expr("pool", "NotIn", &["online"])]);
        assert!(matches(&not_in, &node(&[("pool", "batch")])));
        assert!(matches(&not_in, &node(&[])));
        assert!(!matches(&not_in, &node(&[("pool", "online")])));

        let exists = selector(&[], vec![expr("gpu", "Exists", &[])]);
        assert!(matches(&exists, &node(&[("gpu", "")])));
        assert!(!matches(&exists, &node(&[("zone", "us-east")])));

        let absent = selector(&[], vec![expr("gpu", "DoesNotExist", &[])]);
        assert!(matches(&absent, &node(&[("zone", "us-east")])));
        assert!(!matches(&absent, &node(&[("gpu", "a100")])));
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let sel = LabelSelector::default();
        assert!(!has_match_criteria(&sel));
        assert!(matches(&sel, &node(&[])));
        assert!(matches(&sel, &node(&[("zone", "us-east")])));
    }

    #[test]
    fn test_compile_errors() {
        let cases = vec![
            selector(&[], vec![expr("pool", "Gt", &["1"])]),
            selector(&[], vec![expr("pool", "In", &[])]),
            selector(&[], vec![expr("pool", "NotIn", &[])]),
            selector(&[], vec![expr("pool", "Exists", &["batch"])]),
            selector(&[], vec![expr("bad key", "Exists", &[])]),
            selector(&[("zone", "not valid!")], vec![]),
            selector(&[("-zone", "us-east")], vec![]),
        ];

        for sel in cases {
            let result = LabelSelectorCompiler.compile(&sel);
            assert!(
                matches!(result, Err(ResolverError::InvalidSelector { .. })),
                "expected compile failure for {:?}",
                sel
            );
        }
    }

    #[test]
    fn test_errors_use_wire_operator_names() {
        let err = LabelSelectorCompiler
            .compile(&selector(&[], vec![expr("gpu", "DoesNotExist", &["a100"])]))
            .err()
            .unwrap();
        assert!(err.to_string().contains("operator DoesNotExist on key 'gpu'"));

        let err = LabelSelectorCompiler
            .compile(&selector(&[], vec![expr("pool", "NotIn", &[])]))
            .err()
            .unwrap();
        assert!(err.to_string().contains("operator NotIn on key 'pool'"));

        assert_eq!(Operator::Exists.to_string(), "Exists");
        assert_eq!(Operator::In.to_string(), "In");
    }

    #[test]
    fn test_label_key_syntax() {
        assert!(is_valid_label_key("zone"));
        assert!(is_valid_label_key("topology.kubernetes.io/zone"));
        assert!(is_valid_label_key("node_pool.v2"));

        assert!(!is_valid_label_key(""));
        assert!(!is_valid_label_key("Example.com/zone"));
        assert!(!is_valid_label_key("example.com/"));
        assert!(!is_valid_label_key("zone-"));
        assert!(!is_valid_label_key(&"a".repeat(64)));
    }

    #[test]
    fn test_label_value_syntax() {
        assert!(is_valid_label_value(""));
        assert!(is_valid_label_value("us-east-1"));
        assert!(is_valid_label_value("A_b.c"));

        assert!(!is_valid_label_value("us east"));
        assert!(!is_valid_label_value(".hidden"));
        assert!(!is_valid_label_value(&"v".repeat(64)));
    }
}
