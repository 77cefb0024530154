//! Query result cache.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;

use crate::semantic::SearchResult;

/// Distinct queries kept before the oldest entry is evicted.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Cached result lists keyed by the exact query string.
///
/// Entries are only valid for the index they were computed from; the owner
/// calls [`invalidate`](Self::invalidate) whenever the index changes. At
/// most `capacity` queries are kept, evicting the oldest insertion first.
#[derive(Debug)]
pub struct ResultCache {
    entries: RwLock<Entries>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct Entries {
    results: HashMap<String, Vec<SearchResult>>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache holding at most `capacity` queries. Zero disables caching.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            capacity,
        }
    }

    /// Returns the cached results for `query`, computing them with `build`
    /// on a miss.
    pub fn get_or_build<F>(&self, query: &str, build: F) -> Vec<SearchResult>
    where
        F: FnOnce() -> Vec<SearchResult>,
    {
        if let Some(results) = self.entries.read().results.get(query) {
            tracing::debug!("Result cache hit for '{query}'");
            return results.clone();
        }

        let results = build();
        if self.capacity == 0 {
            return results;
        }

        let mut entries = self.entries.write();
        if !entries.results.contains_key(query) {
            while entries.order.len() >= self.capacity {
                if let Some(oldest) = entries.order.pop_front() {
                    entries.results.remove(&oldest);
                }
            }
            entries.order.push_back(query.to_string());
        }
        entries.results.insert(query.to_string(), results.clone());
        results
    }

    pub fn get(&self, query: &str) -> Option<Vec<SearchResult>> {
        self.entries.read().results.get(query).cloned()
    }

    /// Drops every cached entry.
    pub fn invalidate(&self) {
        let mut entries = self.entries.write();
        entries.results.clear();
        entries.order.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.read().results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().results.is_empty()
    }
}
