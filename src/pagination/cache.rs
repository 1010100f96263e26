//! Staleness window for fetched pages.

use super::SearchPage;
use crate::types::SearchQuery;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    page: SearchPage,
}

/// Pages fetched recently, keyed by (trimmed text, page).
///
/// Expired entries are evicted when looked up and swept on every insert.
#[derive(Debug, Clone)]
pub struct PageCache {
    ttl: Option<Duration>,
    entries: HashMap<(String, u32), CacheEntry>,
}

impl PageCache {
    /// Creates a cache; `None` disables reuse entirely.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// Gets a fresh page for the query.
    pub fn get(&mut self, query: &SearchQuery) -> Option<SearchPage> {
        let ttl = self.ttl?;
        let key = Self::key(query);

        let fresh = self.entries.get(&key)?.stored_at.elapsed() < ttl;
        if fresh {
            self.entries.get(&key).map(|entry| entry.page.clone())
        } else {
            self.entries.remove(&key);
            None
        }
    }

    /// Stores a fetched page.
    pub fn insert(&mut self, page: SearchPage) {
        let Some(ttl) = self.ttl else {
            return;
        };
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);

        let key = Self::key(&page.query);
        self.entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                page,
            },
        );
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(query: &SearchQuery) -> (String, u32) {
        (query.text().trim().to_string(), query.page())
    }
}
