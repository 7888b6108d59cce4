//! Problem record fields
//!
//! A problem is stored by the daemon as a dump directory: one item per
//! field, named by a lower-case key. The client never caches records;
//! `ProblemData` only carries fields on their way to `NewProblem`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Item names the daemon's hooks write into a dump directory.
pub mod fields {
    pub const ANALYZER: &str = "analyzer";
    pub const TYPE: &str = "type";
    pub const REASON: &str = "reason";
    pub const EXECUTABLE: &str = "executable";
    pub const BACKTRACE: &str = "backtrace";
    pub const COMMENT: &str = "comment";
}

/// Field name to value mapping for a single problem.
///
/// Keys are kept sorted so the socket request is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemData {
    items: BTreeMap<String, String>,
}

impl ProblemData {
    /// Creates an empty set of fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets `name` to `value`, returning the previous value if any
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.items.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.items.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.items.remove(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over `(name, value)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Borrows the underlying map
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.items
    }
}

impl From<BTreeMap<String, String>> for ProblemData {
    fn from(items: BTreeMap<String, String>) -> Self {
        Self { items }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProblemData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            items: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
