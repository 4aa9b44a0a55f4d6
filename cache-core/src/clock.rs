//! A clock is a value capability rather than a global: it is passed
//! explicitly into [`crate::engine::Cache::new`] so tests can advance time
//! deterministically instead of sleeping on the wall clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns a monotonically non-decreasing count of seconds. Expiration
/// comparisons use `<=`, so an item whose `expires_at` equals `now` is
/// already expired.
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the unix epoch")
            .as_secs()
    }
}

/// A clock stub for tests. The value only advances when [`SteppedClock::tick`]
/// is called explicitly.
#[derive(Debug, Default)]
pub struct SteppedClock {
    now: AtomicU64,
}

impl SteppedClock {
    pub fn new() -> Self {
        Self {
            now: AtomicU64::new(0),
        }
    }

    pub fn at(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Advance the clock by one second and return the new value.
    pub fn tick(&self) -> u64 {
        self.now.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Advance the clock by `secs` seconds and return the new value.
    pub fn advance(&self, secs: u64) -> u64 {
        self.now.fetch_add(secs, Ordering::SeqCst) + secs
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_clock_only_advances_on_tick() {
        let clock = SteppedClock::new();
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.tick(), 1);
        assert_eq!(clock.now(), 1);
    }

    #[test]
    fn stepped_clock_advance_by_n() {
        let clock = SteppedClock::at(10);
        assert_eq!(clock.advance(5), 15);
        assert_eq!(clock.now(), 15);
    }
}
