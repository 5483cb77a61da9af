//! Name-keyed catalogs of rule sets, loaders and dumpers.

use indexmap::IndexMap;

/// An insertion-ordered collection of entries looked up by name.
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    kind: &'static str,
    entries: IndexMap<String, T>,
}

impl<T> Catalog<T> {
    /// Create an empty catalog of `kind` entries (`"loader"`, `"rule set"`, …).
    #[must_use]
    pub fn new(kind: &'static str) -> Self {
        Catalog {
            kind,
            entries: IndexMap::new(),
        }
    }

    /// Add an entry, returning the one it replaced.
    pub fn register(&mut self, name: impl Into<String>, entry: T) -> Option<T> {
        let name = name.into();
        let previous = self.entries.insert(name.clone(), entry);
        if previous.is_some() {
            tracing::debug!(kind = self.kind, %name, "catalog entry replaced");
        }
        previous
    }

    /// Entry registered as `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    /// Remove and return the entry registered as `name`.
    pub fn take(&mut self, name: &str) -> Option<T> {
        self.entries.shift_remove(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// What the catalog holds.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
