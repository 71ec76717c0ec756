//! Resource registry.
//!
//! Resources are keyed by name (legacy `id`, else empty string) and iterate
//! in descriptor order. A later resource with an already-registered name
//! replaces the earlier entry in place: the key keeps its first position,
//! the value comes from the last resource.

use std::collections::HashMap;

use serde_json::Value as Json;
use tracing::warn;

use crate::error::{PackageError, PackageResult};
use crate::schema::ResourceEntry;

/// Ordered index of a package's resources.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    order: Vec<String>,
    entries: HashMap<String, ResourceEntry>,
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from a descriptor's `resources` array.
    pub fn from_descriptor_resources(resources: &[Json]) -> Self {
        let mut registry = Self::new();
        for resource in resources {
            registry.insert(ResourceEntry::from_json(resource));
        }
        registry
    }

    /// Register an entry, replacing any entry with the same name.
    ///
    /// Returns the replaced entry.
    pub fn insert(&mut self, entry: ResourceEntry) -> Option<ResourceEntry> {
        let name = entry.name.clone();
        let previous = self.entries.insert(name.clone(), entry);
        match &previous {
            Some(_) => warn!(resource = %name, "Duplicate resource name, later entry wins"),
            None => self.order.push(name),
        }
        previous
    }

    /// Look up a resource by name.
    pub fn get(&self, name: &str) -> PackageResult<&ResourceEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| PackageError::ResourceNotFound(name.to_string()))
    }

    /// Returns true if a resource is registered under the name.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Resource names in iteration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Resources in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_preserves_descriptor_order() {
        let resources = vec![
            json!({"name": "b", "path": "b.csv"}),
            json!({"name": "a", "path": "a.csv"}),
            json!({"name": "c", "path": "c.csv"}),
        ];
        let registry = ResourceRegistry::from_descriptor_resources(&resources);

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let resources = vec![
            json!({"name": "x", "path": "first.csv"}),
            json!({"name": "y", "path": "y.csv"}),
            json!({"name": "x", "path": "second.csv"}),
        ];
        let registry = ResourceRegistry::from_descriptor_resources(&resources);

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.get("x").unwrap().location.as_deref(),
            Some("second.csv")
        );
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, ["x", "y"]);
    }

    #[test]
    fn test_unnamed_resources_share_empty_key() {
        let resources = vec![json!({"path": "one.csv"}), json!({"path": "two.csv"})];
        let registry = ResourceRegistry::from_descriptor_resources(&resources);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("").unwrap().location.as_deref(), Some("two.csv"));
    }

    #[test]
    fn test_lookup_missing_resource() {
        let registry = ResourceRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.get("ghost"),
            Err(PackageError::ResourceNotFound(name)) if name == "ghost"
        ));
    }
}
