//! Request-scoped resource cache
//!
//! Memoizes fetched object lists for exactly one graph computation,
//! preventing duplicate cluster calls when several rules need the same
//! listing. The cache is constructed at request start, cleared at both
//! start and end of a computation (including the error path), and is never
//! shared across requests.

use serde_json::Value;
use std::collections::HashMap;

/// Cache key: a kind name plus its scope
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    kind: String,
    /// None for a cluster-wide listing
    namespace: Option<String>,
}

/// Per-computation listing cache
#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: HashMap<CacheKey, Vec<Value>>,
    hits: usize,
    misses: usize,
}

impl ResourceCache {
    /// Create a new empty cache for one computation
    pub fn new() -> Self {
        let mut cache = Self::default();
        // Explicit clear at construction: a computation must never observe
        // state from a previous one
        cache.clear();
        cache
    }

    /// Remove all cached listings
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Look up a cached listing
    pub fn get(&mut self, kind: &str, namespace: Option<&str>) -> Option<&Vec<Value>> {
        let key = CacheKey {
            kind: kind.to_string(),
            namespace: namespace.map(|s| s.to_string()),
        };
        if self.entries.contains_key(&key) {
            self.hits += 1;
            self.entries.get(&key)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Store a listing
    pub fn insert(&mut self, kind: &str, namespace: Option<&str>, resources: Vec<Value>) {
        let key = CacheKey {
            kind: kind.to_string(),
            namespace: namespace.map(|s| s.to_string()),
        };
        self.entries.insert(key, resources);
    }

    /// Number of distinct listings held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since the last clear
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_or_insert_roundtrip() {
        let mut cache = ResourceCache::new();
        assert!(cache.get("Pod", Some("default")).is_none());

        cache.insert("Pod", Some("default"), vec![json!({"kind": "Pod"})]);
        assert_eq!(cache.get("Pod", Some("default")).unwrap().len(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_scope_is_part_of_the_key() {
        let mut cache = ResourceCache::new();
        cache.insert("Pod", Some("a"), vec![json!({})]);

        assert!(cache.get("Pod", Some("b")).is_none());
        assert!(cache.get("Pod", None).is_none());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut cache = ResourceCache::new();
        cache.insert("Pod", None, vec![json!({})]);
        cache.get("Pod", None);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), (0, 0));
    }
}
