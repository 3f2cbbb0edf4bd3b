//! Cache backend adapter.
//!
//! # Data Flow
//! ```text
//! LookupKey (validated, non-empty)
//!     → CacheBackend::lookup
//!         → redis.rs  (pooled GET, one checkout per lookup)
//!         → memory.rs (in-process map, development and tests)
//!     → LookupOutcome: Hit(value) | Miss | BackendError(cause)
//! ```
//!
//! # Design Decisions
//! - Absence is a value (`Miss`), never an error
//! - Exactly one backend exchange per lookup; no retries here
//! - No local tier: every lookup goes to the backend
//! - The backend is constructed once at startup and passed in explicitly

pub mod memory;
pub mod redis;

use std::time::Duration;

use thiserror::Error;

use crate::config::{BackendKind, CacheConfig};
use crate::observability::metrics;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// A non-empty key identifying a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey(String);

impl LookupKey {
    /// Validate and wrap a raw key.
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyKey> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(EmptyKey);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LookupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejection for an empty lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("key must not be empty")]
pub struct EmptyKey;

/// Result of a single lookup.
#[derive(Debug)]
pub enum LookupOutcome {
    /// The backend holds a value for the key.
    Hit(String),
    /// The backend answered and the key is absent.
    Miss,
    /// The backend could not be asked or did not answer properly.
    BackendError(CacheError),
}

impl LookupOutcome {
    /// Low-cardinality label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            LookupOutcome::Hit(_) => "hit",
            LookupOutcome::Miss => "miss",
            LookupOutcome::BackendError(_) => "error",
        }
    }
}

/// Errors raised while talking to the cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    /// No pooled connection could be checked out.
    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// The backend rejected the command or the connection broke.
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    /// The command did not complete in time.
    #[error("backend did not answer within {0:?}")]
    Timeout(Duration),

    /// The pool could not be built from configuration.
    #[error("failed to create connection pool: {0}")]
    CreatePool(#[from] deadpool_redis::CreatePoolError),

    /// The configured address cannot form a connection URL.
    #[error("invalid backend address '{0}'")]
    InvalidAddress(String),
}

/// The configured cache store.
#[derive(Clone)]
pub enum CacheBackend {
    /// Redis behind a connection pool.
    Redis(RedisStore),
    /// In-process map.
    Memory(MemoryStore),
}

impl CacheBackend {
    /// Build the store selected by configuration.
    ///
    /// Pool creation does not connect; use [`CacheBackend::ping`] to probe.
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        match config.backend {
            BackendKind::Redis => Ok(CacheBackend::Redis(RedisStore::from_config(config)?)),
            BackendKind::Memory => Ok(CacheBackend::Memory(MemoryStore::new())),
        }
    }

    /// Look `key` up in the backend.
    pub async fn lookup(&self, key: &LookupKey) -> LookupOutcome {
        let outcome = match self {
            CacheBackend::Redis(store) => store.lookup(key).await,
            CacheBackend::Memory(store) => store.lookup(key).await,
        };
        metrics::record_lookup(outcome.label());
        outcome
    }

    /// Check that the backend answers.
    pub async fn ping(&self) -> Result<(), CacheError> {
        match self {
            CacheBackend::Redis(store) => store.ping().await,
            CacheBackend::Memory(_) => Ok(()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CacheBackend::Redis(_) => "redis",
            CacheBackend::Memory(_) => "memory",
        }
    }
}

impl From<MemoryStore> for CacheBackend {
    fn from(store: MemoryStore) -> Self {
        CacheBackend::Memory(store)
    }
}

impl From<RedisStore> for CacheBackend {
    fn from(store: RedisStore) -> Self {
        CacheBackend::Redis(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_rejected() {
        assert_eq!(LookupKey::new(""), Err(EmptyKey));
        assert_eq!(LookupKey::new("user:42").unwrap().as_str(), "user:42");
    }

    #[tokio::test]
    async fn memory_backend_from_config() {
        let config = CacheConfig {
            backend: BackendKind::Memory,
            ..CacheConfig::default()
        };
        let backend = CacheBackend::from_config(&config).unwrap();
        assert_eq!(backend.kind(), "memory");
        assert!(backend.ping().await.is_ok());

        let key = LookupKey::new("anything").unwrap();
        assert!(matches!(backend.lookup(&key).await, LookupOutcome::Miss));
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(LookupOutcome::Hit("v".into()).label(), "hit");
        assert_eq!(LookupOutcome::Miss.label(), "miss");
        assert_eq!(
            LookupOutcome::BackendError(CacheError::Timeout(Duration::from_secs(1))).label(),
            "error"
        );
    }
}
