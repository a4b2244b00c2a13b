//! Core types shared by the client and the engines behind it.

use serde::{Deserialize, Serialize};

/// Identifier of a database. Zero means "unset".
pub type DatabaseId = u64;
/// Identifier of a table. Zero means "unset".
pub type TableId = u64;
/// Identifier of a quorum.
pub type QuorumId = u64;
/// Identifier of a cluster node.
pub type NodeId = u64;

/// Default global request timeout, in milliseconds.
pub const DEFAULT_GLOBAL_TIMEOUT_MS: u64 = 120_000;
/// Default master-election timeout, in milliseconds (three lease periods).
pub const DEFAULT_MASTER_TIMEOUT_MS: u64 = 21_000;

// =============================================================================
// ClusterConfig
// =============================================================================

/// Ordered list of controller endpoints used to bootstrap a connection.
///
/// The order is preserved; engines try nodes in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    nodes: Vec<String>,
}

impl ClusterConfig {
    /// Create a config from endpoint strings such as `"10.0.0.1:7080"`.
    pub fn new<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }

    /// Append an endpoint.
    pub fn push(&mut self, node: impl Into<String>) {
        self.nodes.push(node.into());
    }

    /// Endpoints in configuration order.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Number of endpoints.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no endpoint is configured.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ClusterConfig {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

// =============================================================================
// KeyValues
// =============================================================================

/// Insertion-ordered mapping from key to value.
///
/// Inserting a key that is already present replaces its value but keeps the
/// key at its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValues {
    entries: Vec<(String, String)>,
}

impl KeyValues {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns the previous value for the key, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeyValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut kv = KeyValues::new();
        for (k, v) in iter {
            kv.insert(k, v);
        }
        kv
    }
}

impl IntoIterator for KeyValues {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
