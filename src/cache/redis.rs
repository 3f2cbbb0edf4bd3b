//! Redis store behind a `deadpool-redis` connection pool.
//!
//! # Responsibilities
//! - Build the pool from configuration (size, wait/create/recycle timeouts)
//! - Check out one connection per lookup and return it when the lookup ends
//! - Classify `GET` replies: value → Hit, nil → Miss, anything else → error
//! - Present values are always a Hit, even when they are not valid UTF-8
//!
//! # Design Decisions
//! - Pool creation is lazy; nothing connects until the first checkout
//! - Every command runs under a deadline so a stalled backend reads as an error
//! - The password is carried in the connection URL and never logged

use std::time::Duration;

use deadpool_redis::{Config, Pool, PoolConfig, Runtime};
use redis::AsyncCommands;
use url::Url;

use crate::cache::{CacheError, LookupKey, LookupOutcome};
use crate::config::CacheConfig;

/// Pooled Redis client.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
    command_timeout: Duration,
}

impl RedisStore {
    /// Create the pool described by `config`.
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheError> {
        let url = connection_url(config)?;
        let timeout = Duration::from_millis(config.timeout_ms);

        let mut pool_config = PoolConfig::new(config.pool_size);
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);

        let mut redis_config = Config::from_url(url.as_str());
        redis_config.pool = Some(pool_config);

        let pool = redis_config.create_pool(Some(Runtime::Tokio1))?;

        tracing::debug!(
            address = %config.address,
            database = config.database,
            pool_size = config.pool_size,
            "Redis pool created"
        );

        Ok(Self {
            pool,
            command_timeout: timeout,
        })
    }

    pub async fn lookup(&self, key: &LookupKey) -> LookupOutcome {
        match tokio::time::timeout(self.command_timeout, self.get(key)).await {
            Ok(Ok(Some(value))) => LookupOutcome::Hit(value),
            Ok(Ok(None)) => LookupOutcome::Miss,
            Ok(Err(e)) => LookupOutcome::BackendError(e),
            Err(_) => LookupOutcome::BackendError(CacheError::Timeout(self.command_timeout)),
        }
    }

    /// Values are read as bytes; invalid UTF-8 is replaced, not rejected.
    async fn get(&self, key: &LookupKey) -> Result<Option<String>, CacheError> {
        let mut conn = self.pool.get().await?;
        let value = conn.get::<_, Option<Vec<u8>>>(key.as_str()).await?;
        Ok(value.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Round-trip a `PING` through a pooled connection.
    pub async fn ping(&self) -> Result<(), CacheError> {
        let probe = async {
            let mut conn = self.pool.get().await?;
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, CacheError>(())
        };
        tokio::time::timeout(self.command_timeout, probe)
            .await
            .map_err(|_| CacheError::Timeout(self.command_timeout))?
    }
}

/// Build `redis://[:password@]host:port/db` from configuration.
pub fn connection_url(config: &CacheConfig) -> Result<Url, CacheError> {
    let invalid = || CacheError::InvalidAddress(config.address.clone());

    let mut url = Url::parse(&format!("redis://{}/{}", config.address, config.database))
        .map_err(|_| invalid())?;
    if !url.has_host() {
        return Err(invalid());
    }
    if !config.password.is_empty() {
        url.set_password(Some(&config.password)).map_err(|_| invalid())?;
    }
    Ok(url)
}
