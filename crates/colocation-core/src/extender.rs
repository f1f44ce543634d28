use crate::{ColocationError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Open-ended set of extension sub-policies attached to a strategy
///
/// Keys name an extension; values are arbitrary JSON payloads that the
/// extension owner decodes with [`Extender::get_as`]. Unknown keys are
/// carried through untouched, so new policies can be rolled out without
/// changing the strategy schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extender(BTreeMap<String, serde_json::Value>);

impl Extender {
    /// Create an empty extender
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get the raw payload of an extension
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert a raw payload, returning the previous one
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.0.insert(key.into(), value)
    }

    /// Encode a typed policy and store it under `key`
    pub fn insert_policy<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        policy: &T,
    ) -> Result<()> {
        let key = key.into();
        let value = serde_json::to_value(policy).map_err(|e| {
            ColocationError::serialization_error(
                format!("Failed to encode extension '{}': {}", key, e),
                Some(Box::new(e)),
            )
        })?;
        self.0.insert(key, value);
        Ok(())
    }

    /// Decode the extension stored under `key` into a typed policy
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.0.get(key) {
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                ColocationError::serialization_error(
                    format!("Failed to decode extension '{}': {}", key, e),
                    Some(Box::new(e)),
                )
            }),
            None => Ok(None),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

impl FromIterator<(String, serde_json::Value)> for Extender {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, serde_json::Value>> for Extender {
    fn from(map: BTreeMap<String, serde_json::Value>) -> Self {
        Self(map)
    }
}
