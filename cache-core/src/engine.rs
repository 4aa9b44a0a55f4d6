//! The cache engine: the eight mutation/query operations the protocol
//! dispatcher talks to, built on top of [`Store`] + [`Stats`] + an injected
//! [`Clock`].

use crate::clock::Clock;
use crate::error::EngineError;
use crate::store::{CachedItem, Store, DEFAULT_MAX_ITEMS};
use crate::stats::Stats;

/// A capacity-bounded, TTL-aware key/value cache.
///
/// `ttl == 0` means "never expires"; any other value is a relative offset
/// (in clock units, seconds in production) added to `now` at the moment of
/// the call. `append`/`prepend` overwrite the expiration with the caller's
/// new `ttl` rather than preserving the prior one — see the design notes on
/// this being a deliberate, if debatable, choice inherited from the source.
pub struct Cache<C: Clock> {
    store: Store,
    stats: Stats,
    clock: C,
}

impl<C: Clock> Cache<C> {
    pub fn new(clock: C) -> Self {
        Self::with_capacity(clock, DEFAULT_MAX_ITEMS)
    }

    pub fn with_capacity(clock: C, max_items: usize) -> Self {
        Self {
            store: Store::new(max_items),
            stats: Stats::new(),
            clock,
        }
    }

    fn expires_at(&self, ttl: u32) -> Option<u64> {
        if ttl == 0 {
            None
        } else {
            Some(self.clock.now() + ttl as u64)
        }
    }

    /// Overwrites `key` unconditionally. Bumps `sets`.
    pub fn set(&mut self, key: &str, value: Vec<u8>, ttl: u32) -> CachedItem {
        let item = CachedItem::new(key, value, self.expires_at(ttl));
        self.store.put(key.to_string(), item.clone());
        self.stats.record_set();
        item
    }

    /// Returns the value for `key`, or `None` on a miss (absent or expired).
    /// Updates the hit/miss counters.
    pub fn get(&mut self, key: &str) -> Option<Vec<u8>> {
        let now = self.clock.now();
        match self.store.get_raw(key, now) {
            Some(item) => {
                self.stats.record_hit();
                Some(item.value.clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Stores `value` only if `key` is not currently valid.
    pub fn add(&mut self, key: &str, value: Vec<u8>, ttl: u32) -> bool {
        let now = self.clock.now();
        if self.store.contains_valid(key, now) {
            return false;
        }
        self.store
            .put(key.to_string(), CachedItem::new(key, value, self.expires_at(ttl)));
        true
    }

    /// Stores `value` only if `key` is currently valid.
    pub fn replace(&mut self, key: &str, value: Vec<u8>, ttl: u32) -> bool {
        let now = self.clock.now();
        if !self.store.contains_valid(key, now) {
            return false;
        }
        self.store
            .put(key.to_string(), CachedItem::new(key, value, self.expires_at(ttl)));
        true
    }

    /// Writes `old ∥ value` with the new ttl, if `key` is currently valid.
    pub fn append(&mut self, key: &str, value: &[u8], ttl: u32) -> bool {
        self.concat(key, value, ttl, false)
    }

    /// Writes `value ∥ old` with the new ttl, if `key` is currently valid.
    pub fn prepend(&mut self, key: &str, value: &[u8], ttl: u32) -> bool {
        self.concat(key, value, ttl, true)
    }

    fn concat(&mut self, key: &str, value: &[u8], ttl: u32, prepend: bool) -> bool {
        let now = self.clock.now();
        let current = match self.store.get_raw(key, now) {
            Some(item) => item.value.clone(),
            None => return false,
        };
        let mut combined = if prepend {
            Vec::with_capacity(value.len() + current.len())
        } else {
            Vec::with_capacity(current.len() + value.len())
        };
        if prepend {
            combined.extend_from_slice(value);
            combined.extend_from_slice(&current);
        } else {
            combined.extend_from_slice(&current);
            combined.extend_from_slice(value);
        }
        self.store
            .put(key.to_string(), CachedItem::new(key, combined, self.expires_at(ttl)));
        true
    }

    /// Increments the decimal integer stored at `key` by `delta`, preserving
    /// the existing expiration. `None` if absent/expired. Errors if the
    /// stored value isn't a decimal integer.
    pub fn incr(&mut self, key: &str, delta: u64) -> Result<Option<i64>, EngineError> {
        self.incr_or_decr(key, delta as i64)
    }

    /// Symmetric with [`Cache::incr`]. Underflow wraps rather than clamping
    /// at zero or panicking — see the design notes.
    pub fn decr(&mut self, key: &str, delta: u64) -> Result<Option<i64>, EngineError> {
        self.incr_or_decr(key, (delta as i64).wrapping_neg())
    }

    fn incr_or_decr(&mut self, key: &str, signed_delta: i64) -> Result<Option<i64>, EngineError> {
        let now = self.clock.now();
        let item = match self.store.get_raw(key, now) {
            Some(item) => item.clone(),
            None => return Ok(None),
        };
        let text = std::str::from_utf8(&item.value).map_err(|_| EngineError::NonNumericValue)?;
        let current: i64 = text
            .trim()
            .parse()
            .map_err(|_| EngineError::NonNumericValue)?;
        let updated = current.wrapping_add(signed_delta);
        let mut updated_item = item;
        updated_item.value = updated.to_string().into_bytes();
        self.store.put(key.to_string(), updated_item);
        Ok(Some(updated))
    }

    /// Removes `key` if currently valid.
    pub fn delete(&mut self, key: &str) -> bool {
        let now = self.clock.now();
        self.store.remove(key, now)
    }

    /// Clears every entry. Always succeeds; counters are untouched.
    pub fn flush_all(&mut self) -> bool {
        self.store.clear();
        true
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.store.keys()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppedClock;

    fn cache() -> Cache<SteppedClock> {
        Cache::new(SteppedClock::new())
    }

    #[test]
    fn get_on_empty_cache_is_a_miss() {
        let mut cache = cache();
        assert_eq!(cache.get("foobar"), None);
        assert_eq!(cache.stats().get_misses(), 1);
        assert_eq!(cache.stats().get_hits(), 0);
        assert_eq!(cache.stats().sets(), 0);
    }

    #[test]
    fn set_bumps_sets_and_not_hits_or_misses() {
        let mut cache = cache();
        let item = cache.set("foobar", b"cached".to_vec(), 3);
        assert_eq!(item.key, "foobar");
        assert_eq!(item.value, b"cached");
        assert_eq!(cache.stats().sets(), 1);
        assert_eq!(cache.stats().get_hits(), 0);
        assert_eq!(cache.stats().get_misses(), 0);
    }

    #[test]
    fn set_ttl_zero_never_expires() {
        let mut cache = cache();
        cache.set("foo", b"bar".to_vec(), 0);
        for _ in 0..1000 {
            cache.clock.tick();
        }
        assert_eq!(cache.get("foo"), Some(b"bar".to_vec()));
    }

    #[test]
    fn get_after_ttl_elapses_is_a_miss() {
        let mut cache = cache();
        cache.set("foobar", b"cache".to_vec(), 2);
        cache.clock.tick();
        cache.clock.tick();
        assert_eq!(cache.get("foobar"), None);
    }

    #[test]
    fn get_before_ttl_elapses_is_a_hit() {
        let mut cache = cache();
        cache.set("foo", b"hello".to_vec(), 2);
        cache.clock.tick();
        assert_eq!(cache.get("foo"), Some(b"hello".to_vec()));
        assert_eq!(cache.stats().get_hits(), 1);
    }

    #[test]
    fn incr_on_absent_key_is_none() {
        let mut cache = cache();
        assert_eq!(cache.incr("foobar", 1), Ok(None));
    }

    #[test]
    fn incr_on_non_numeric_value_errors() {
        let mut cache = cache();
        cache.set("foo", b"bar".to_vec(), 0);
        assert_eq!(cache.incr("foo", 10), Err(EngineError::NonNumericValue));
    }

    #[test]
    fn incr_adds_delta_and_preserves_ttl() {
        let mut cache = cache();
        cache.set("foo", b"12".to_vec(), 0);
        assert_eq!(cache.incr("foo", 10), Ok(Some(22)));
        assert_eq!(cache.get("foo"), Some(b"22".to_vec()));
    }

    #[test]
    fn decr_subtracts_delta() {
        let mut cache = cache();
        cache.set("foo", b"10".to_vec(), 0);
        assert_eq!(cache.decr("foo", 4), Ok(Some(6)));
    }

    #[test]
    fn decr_below_zero_does_not_panic() {
        let mut cache = cache();
        cache.set("foo", b"1".to_vec(), 0);
        assert_eq!(cache.decr("foo", 5), Ok(Some(-4)));
    }

    #[test]
    fn delete_on_absent_key_is_a_noop() {
        let mut cache = cache();
        assert!(!cache.delete("foobar"));
    }

    #[test]
    fn delete_on_present_key_removes_it() {
        let mut cache = cache();
        cache.set("foo", b"bar".to_vec(), 0);
        assert!(cache.delete("foo"));
        assert_eq!(cache.get("foo"), None);
    }

    #[test]
    fn add_only_stores_when_absent() {
        let mut cache = cache();
        assert!(cache.add("foo", b"bar".to_vec(), 10));
        assert!(!cache.add("foo", b"barz".to_vec(), 10));
        assert_eq!(cache.get("foo"), Some(b"bar".to_vec()));
    }

    #[test]
    fn replace_only_stores_when_present() {
        let mut cache = cache();
        assert!(!cache.replace("foo123", b"bar".to_vec(), 0));
        cache.set("foo", b"111".to_vec(), 0);
        assert!(cache.replace("foo", b"bar".to_vec(), 0));
        assert_eq!(cache.get("foo"), Some(b"bar".to_vec()));
    }

    #[test]
    fn append_concatenates_after_existing_value() {
        let mut cache = cache();
        assert!(!cache.append("foo", b"bar", 0));
        cache.set("foo", b"bar".to_vec(), 0);
        assert!(cache.append("foo", b"123", 0));
        assert_eq!(cache.get("foo"), Some(b"bar123".to_vec()));
    }

    #[test]
    fn prepend_concatenates_before_existing_value() {
        let mut cache = cache();
        assert!(!cache.prepend("foo", b"bar", 0));
        cache.set("foo", b"bar".to_vec(), 0);
        assert!(cache.prepend("foo", b"123", 0));
        assert_eq!(cache.get("foo"), Some(b"123bar".to_vec()));
    }

    #[test]
    fn flush_all_clears_everything_and_is_idempotent() {
        let mut cache = cache();
        cache.set("foo", b"bar".to_vec(), 0);
        assert_eq!(cache.keys().count(), 1);
        assert!(cache.flush_all());
        assert_eq!(cache.keys().count(), 0);
        assert_eq!(cache.get("foo"), None);
        assert!(cache.flush_all());
        assert_eq!(cache.keys().count(), 0);
    }

    #[test]
    fn eviction_keeps_the_capacity_most_recently_touched_keys() {
        let mut cache = Cache::with_capacity(SteppedClock::new(), 3);
        for i in 0..5 {
            cache.set(&format!("k{}", i), vec![i as u8], 0);
        }
        assert_eq!(cache.keys().count(), 3);
        assert!(cache.get("k0").is_none());
        assert!(cache.get("k1").is_none());
        assert!(cache.get("k2").is_some());
        assert!(cache.get("k3").is_some());
        assert!(cache.get("k4").is_some());
    }
}
