//! In-process store backed by `DashMap`.
//!
//! Used for local development (`cache.backend = "memory"`) and tests. Entries
//! are seeded through [`MemoryStore::insert`]; the HTTP surface never writes.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::cache::{LookupKey, LookupOutcome};

/// A shared in-memory key/value map with optional simulated latency.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
    latency: Duration,
}

impl MemoryStore {
    /// Create an empty store that answers immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every lookup by `latency`, as a slow backend would.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Seed an entry.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub async fn lookup(&self, key: &LookupKey) -> LookupOutcome {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match self.entries.get(key.as_str()) {
            Some(entry) => LookupOutcome::Hit(entry.value().clone()),
            None => LookupOutcome::Miss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn hit_and_miss() {
        let store = MemoryStore::new();
        store.insert("user:42", "alice");
        assert_eq!(store.len(), 1);

        let hit = store.lookup(&LookupKey::new("user:42").unwrap()).await;
        assert!(matches!(hit, LookupOutcome::Hit(ref v) if v == "alice"));

        let miss = store.lookup(&LookupKey::new("missing").unwrap()).await;
        assert!(matches!(miss, LookupOutcome::Miss));
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();
        handle.insert("k", "v");
        assert!(matches!(
            store.lookup(&LookupKey::new("k").unwrap()).await,
            LookupOutcome::Hit(_)
        ));
    }

    #[tokio::test]
    async fn latency_is_applied() {
        let store = MemoryStore::new().with_latency(Duration::from_millis(50));
        let start = Instant::now();
        store.lookup(&LookupKey::new("k").unwrap()).await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
