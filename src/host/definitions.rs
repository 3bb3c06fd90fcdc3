//! Table of definitions the host has loaded.

use std::sync::Arc;

use dashmap::DashMap;

/// Concurrent name → source table.
///
/// Resolving a name means placing its definition here. Many workers may
/// define and look up at once.
#[derive(Debug, Default)]
pub struct Definitions {
    loaded: DashMap<String, Arc<str>>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the definition for `name`, replacing an earlier one.
    pub fn define(&self, name: &str, source: &str) {
        self.loaded.insert(name.to_string(), Arc::from(source));
    }

    pub fn get(&self, name: &str) -> Option<Arc<str>> {
        self.loaded.get(name).map(|r| r.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loaded.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}
