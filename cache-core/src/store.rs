//! The LRU-bounded map underneath the cache engine. Kept deliberately dumb:
//! it knows nothing about hit/miss statistics or TTL semantics beyond "is
//! this entry's absolute expiration, if any, past `now`" — that split keeps
//! [`crate::stats::Stats`] bookkeeping entirely in the engine layer.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Default capacity used when a caller doesn't specify one.
pub const DEFAULT_MAX_ITEMS: usize = 10_000;

/// A single cached entry. The key is redundant with the map key it's
/// stored under; it's kept so callers iterating via [`Store::keys`] or
/// debugging don't need to thread the key alongside the item by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedItem {
    pub key: String,
    pub value: Vec<u8>,
    pub expires_at: Option<u64>,
}

impl CachedItem {
    pub fn new(key: impl Into<String>, value: Vec<u8>, expires_at: Option<u64>) -> Self {
        Self {
            key: key.into(),
            value,
            expires_at,
        }
    }

    fn is_expired(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// A capacity-bounded, least-recently-used map of key to [`CachedItem`].
///
/// Composition over reimplementation: this wraps [`lru::LruCache`] the same
/// way the original used a pre-built LRU container, rather than
/// hand-rolling an intrusive doubly-linked list.
pub struct Store {
    cache: LruCache<String, CachedItem>,
}

impl Store {
    pub fn new(max_items: usize) -> Self {
        let cap = NonZeroUsize::new(max_items).unwrap_or_else(|| NonZeroUsize::new(1).unwrap());
        Self {
            cache: LruCache::new(cap),
        }
    }

    /// Insert or overwrite `key`. If the key is new and the store is at
    /// capacity, the least-recently-used entry is evicted first. Either way
    /// the entry becomes most-recently-used.
    pub fn put(&mut self, key: String, item: CachedItem) {
        self.cache.put(key, item);
    }

    /// Returns the entry if present and not expired, touching it as
    /// most-recently-used on a valid hit. An expired entry is popped lazily
    /// and never returned.
    pub fn get_raw(&mut self, key: &str, now: u64) -> Option<&CachedItem> {
        let expired = match self.cache.peek(key) {
            Some(item) => item.is_expired(now),
            None => return None,
        };
        if expired {
            self.cache.pop(key);
            return None;
        }
        self.cache.get(key)
    }

    /// Deletes `key`. Returns whether an entry existed and was not already
    /// expired. A lingering expired entry is removed either way.
    pub fn remove(&mut self, key: &str, now: u64) -> bool {
        match self.cache.peek(key) {
            Some(item) if !item.is_expired(now) => {
                self.cache.pop(key);
                true
            }
            Some(_) => {
                self.cache.pop(key);
                false
            }
            None => false,
        }
    }

    /// Same predicate as [`Store::get_raw`] but without touching recency —
    /// used by the dispatcher to test existence without producing a hit stat.
    pub fn contains_valid(&self, key: &str, now: u64) -> bool {
        matches!(self.cache.peek(key), Some(item) if !item.is_expired(now))
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.cache.iter().map(|(k, _)| k)
    }
}
