//! LRU cache for processed views.
//!
//! The pipeline itself never caches; callers that re-issue identical queries
//! put this in front of it. The cache knows nothing about the event list, so
//! callers must `invalidate_all` whenever the events change.

use super::options::{ProcessOptions, QueryWindow};
use super::pipeline::ProcessedView;
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default number of cached views.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Default lifetime of a cached view.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Structural cache key: window bounds at millisecond precision plus every
/// option that changes the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryKey {
    start_millis: i64,
    end_millis: i64,
    options: ProcessOptions,
}

impl QueryKey {
    /// Key for `window` queried with `options`.
    pub fn new(window: &QueryWindow, options: &ProcessOptions) -> Self {
        Self {
            start_millis: window.start().timestamp_millis(),
            end_millis: window.end().timestamp_millis(),
            options: *options,
        }
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that found nothing fresh.
    pub misses: u64,
    /// Views currently stored.
    pub entries: usize,
    /// Views stored before eviction starts.
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache; 0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

struct CachedView {
    view: Arc<ProcessedView>,
    stored_at: Instant,
}

/// Bounded LRU of processed views with a per-entry time to live.
pub struct QueryCache {
    cache: LruCache<QueryKey, CachedView>,
    ttl: Duration,
    hits: u64,
    misses: u64,
}

impl QueryCache {
    /// Create a cache holding up to `capacity` views.
    ///
    /// If capacity is 0, uses [`DEFAULT_CACHE_CAPACITY`].
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            ttl,
            hits: 0,
            misses: 0,
        }
    }

    /// Cached view for `key`, if present and fresh. Refreshes LRU order.
    pub fn get(&mut self, key: &QueryKey) -> Option<Arc<ProcessedView>> {
        let fresh = self
            .cache
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() <= self.ttl)
            .map(|entry| Arc::clone(&entry.view));
        match fresh {
            Some(_) => self.hits += 1,
            None => {
                self.misses += 1;
                self.cache.pop(key);
            }
        }
        fresh
    }

    /// Stores a view, evicting the least recently used one at capacity.
    pub fn insert(&mut self, key: QueryKey, view: ProcessedView) -> Arc<ProcessedView> {
        let view = Arc::new(view);
        self.cache.put(
            key,
            CachedView {
                view: Arc::clone(&view),
                stored_at: Instant::now(),
            },
        );
        view
    }

    /// Cached view, or compute, store and return it.
    pub fn get_or_insert_with(
        &mut self,
        key: QueryKey,
        compute: impl FnOnce() -> ProcessedView,
    ) -> Arc<ProcessedView> {
        if let Some(view) = self.get(&key) {
            return view;
        }
        self.insert(key, compute())
    }

    /// Drops every entry. Counters are kept.
    pub fn invalidate_all(&mut self) {
        tracing::debug!(entries = self.cache.len(), "invalidating query cache");
        self.cache.clear();
    }

    /// Counters plus current size.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.cache.len(),
            capacity: self.cache.cap().get(),
        }
    }

    /// Stored views, stale ones included.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("stats", &self.stats())
            .field("ttl", &self.ttl)
            .finish()
    }
}
