// svckit/src/database/cache.rs
//
// Query-result cache keyed by the literal query text
//

use std::future::Future;
use std::sync::Arc;
use dashmap::DashMap;
use tracing::{debug, info};

use crate::errors::DashError;
use crate::metrics;

/// Materialized results keyed by query text. Entries live until invalidated.
pub struct QueryCache<T> {
    entries: DashMap<String, Arc<T>>,
}

impl<T> QueryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, query: &str) -> Option<Arc<T>> {
        let hit = self.entries.get(query).map(|entry| entry.value().clone());
        metrics::record_cache(hit.is_some());
        hit
    }

    pub fn insert(&self, query: &str, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.entries.insert(query.to_string(), value.clone());
        value
    }

    /// Returns the cached entry or runs `fetch` and stores its result.
    /// Failed fetches are not cached.
    pub async fn get_or_try_fetch<F, Fut>(&self, query: &str, fetch: F) -> Result<Arc<T>, DashError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DashError>>,
    {
        if let Some(hit) = self.get(query) {
            debug!("Query cache hit");
            return Ok(hit);
        }
        let value = fetch().await?;
        Ok(self.insert(query, value))
    }

    pub fn invalidate(&self, query: &str) -> bool {
        let removed = self.entries.remove(query).is_some();
        if removed {
            info!("Invalidated cached result for query");
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
        info!("Cleared query cache");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
