//! Test utilities for essence - instrumented stores and fixtures
//!
//! Shared by the unit and integration test suites to observe what the
//! best-effort storage layer actually did.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{EssenceError, Result};
use crate::mood::sanitize::RawMoodPoint;
use crate::storage::{KvStore, MemoryStore};

/// In-memory store that counts writes, so tests can assert that
/// idempotent operations do not touch storage a second time.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls observed so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl KvStore for CountingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}

/// Store whose writes always fail, simulating quota exhaustion or
/// disabled persistence. Reads pass through to an inner store.
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for FailingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(EssenceError::Storage("quota exceeded".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Err(EssenceError::Storage("storage disabled".to_string()))
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}

/// A well-formed candidate point for the given subject and message.
pub fn sample_point(subject_id: &str, message_id: &str, mood: f64, energy: f64) -> RawMoodPoint {
    RawMoodPoint::new(subject_id, message_id).with_scores(mood, energy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_store_counts_sets_only() {
        let store = CountingStore::new();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.get("a");
        store.remove("a").unwrap();

        assert_eq!(store.writes(), 2);
    }

    #[test]
    fn failing_store_rejects_writes_but_serves_reads() {
        let store = FailingStore::new();
        assert!(store.set("a", "1").is_err());
        assert!(store.get("a").is_none());
    }
}
