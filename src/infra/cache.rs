//! Redis cache implementation.
//!
//! Provides the profile cache, fixed-window rate limiting, refresh-token
//! sessions and distributed locks. Callers depend on the [`CacheStore`]
//! trait so the HTTP layer and services can run against an in-process
//! store in tests.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use uuid::Uuid;

use crate::config::{
    Config, CACHE_PREFIX_LOCK, CACHE_PREFIX_RATE_LIMIT, CACHE_PREFIX_REFRESH, CACHE_PREFIX_USER,
    DEFAULT_CACHE_TTL_SECONDS, DEFAULT_LOCK_RETRIES, DEFAULT_LOCK_RETRY_DELAY_MS,
    DEFAULT_LOCK_TTL_SECONDS,
};
use crate::domain::UserResponse;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cache operations used by services and middleware
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a cached profile
    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<UserResponse>>;

    async fn set_user(&self, user: &UserResponse) -> AppResult<()>;

    async fn invalidate_user(&self, user_id: Uuid) -> AppResult<()>;

    /// Count a request against `identifier`'s window.
    /// Returns (current_count, is_allowed).
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)>;

    /// Remember a refresh token for `user_id`
    async fn store_refresh_token(&self, token: &str, user_id: Uuid, ttl_seconds: u64) -> AppResult<()>;

    /// Atomically read and delete a refresh token, returning its owner
    async fn take_refresh_token(&self, token: &str) -> AppResult<Option<Uuid>>;

    async fn revoke_refresh_token(&self, token: &str) -> AppResult<()>;

    /// Acquire a distributed lock on `resource`, retrying for a short while
    async fn acquire_lock(&self, resource: &str) -> AppResult<Box<dyn DistributedLock>>;

    /// Check connectivity
    async fn ping(&self) -> AppResult<()>;
}

/// A held lock; dropping it without `release` frees it in the background
#[async_trait]
pub trait DistributedLock: Send {
    async fn release(self: Box<Self>) -> AppResult<()>;
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
    default_ttl: u64,
}

impl Cache {
    /// Create a new cache instance and connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self {
            connection,
            default_ttl: DEFAULT_CACHE_TTL_SECONDS,
        })
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    /// Get a value from cache.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await.map_err(cache_error)?;

        match value {
            Some(json) => {
                let parsed = serde_json::from_str(&json).map_err(|e| {
                    AppError::internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Set a value in cache with custom TTL (in seconds).
    pub async fn set_with_ttl<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))?;

        conn.set_ex::<_, _, ()>(key, json, ttl_seconds)
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    /// Delete a value from cache.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await.map_err(cache_error)?;
        Ok(())
    }

    /// Acquire a distributed lock with custom options.
    pub async fn acquire_lock_with_options(
        &self,
        resource: &str,
        ttl_seconds: u64,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> AppResult<LockGuard> {
        let key = format!("{}{}", CACHE_PREFIX_LOCK, resource);
        let lock_id = Uuid::new_v4().to_string();
        let mut conn = self.connection.clone();

        for attempt in 0..=max_retries {
            // SET NX EX: only one holder at a time, auto-expires if the holder dies
            let acquired: bool = redis::cmd("SET")
                .arg(&key)
                .arg(&lock_id)
                .arg("NX")
                .arg("EX")
                .arg(ttl_seconds)
                .query_async(&mut conn)
                .await
                .map(|r: Option<String>| r.is_some())
                .map_err(cache_error)?;

            if acquired {
                tracing::debug!(resource = %resource, lock_id = %lock_id, "Lock acquired");
                return Ok(LockGuard {
                    cache: Arc::new(self.clone()),
                    key,
                    lock_id,
                    released: false,
                });
            }

            if attempt < max_retries {
                sleep(Duration::from_millis(retry_delay_ms)).await;
            }
        }

        tracing::warn!(resource = %resource, "Failed to acquire lock after retries");
        Err(AppError::conflict("Resource is busy, please retry shortly"))
    }

    /// Release a lock (internal use - prefer using LockGuard).
    async fn release_lock(&self, key: &str, lock_id: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();

        // Only delete if the lock_id matches (we own the lock)
        let script = r#"
            if redis.call("GET", KEYS[1]) == ARGV[1] then
                return redis.call("DEL", KEYS[1])
            else
                return 0
            end
        "#;

        let released: i32 = redis::cmd("EVAL")
            .arg(script)
            .arg(1)
            .arg(key)
            .arg(lock_id)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(released == 1)
    }
}

#[async_trait]
impl CacheStore for Cache {
    async fn get_user(&self, user_id: Uuid) -> AppResult<Option<UserResponse>> {
        self.get(&user_key(user_id)).await
    }

    async fn set_user(&self, user: &UserResponse) -> AppResult<()> {
        self.set_with_ttl(&user_key(user.id), user, self.default_ttl)
            .await
    }

    async fn invalidate_user(&self, user_id: Uuid) -> AppResult<()> {
        self.delete(&user_key(user_id)).await
    }

    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let count: u64 = conn.incr(&key, 1u64).await.map_err(cache_error)?;

        // First hit opens the window
        if count == 1 {
            let _: () = conn
                .expire(&key, window_seconds as i64)
                .await
                .map_err(cache_error)?;
        }

        Ok((count, count <= max_requests))
    }

    async fn store_refresh_token(&self, token: &str, user_id: Uuid, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(refresh_key(token), user_id.to_string(), ttl_seconds)
            .await
            .map_err(cache_error)
    }

    async fn take_refresh_token(&self, token: &str) -> AppResult<Option<Uuid>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = redis::cmd("GETDEL")
            .arg(refresh_key(token))
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(value.and_then(|v| Uuid::parse_str(&v).ok()))
    }

    async fn revoke_refresh_token(&self, token: &str) -> AppResult<()> {
        self.delete(&refresh_key(token)).await
    }

    async fn acquire_lock(&self, resource: &str) -> AppResult<Box<dyn DistributedLock>> {
        let guard = self
            .acquire_lock_with_options(
                resource,
                DEFAULT_LOCK_TTL_SECONDS,
                DEFAULT_LOCK_RETRIES,
                DEFAULT_LOCK_RETRY_DELAY_MS,
            )
            .await?;

        Ok(Box::new(guard))
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }
}

fn user_key(user_id: Uuid) -> String {
    format!("{}{}", CACHE_PREFIX_USER, user_id)
}

fn refresh_key(token: &str) -> String {
    format!("{}{}", CACHE_PREFIX_REFRESH, token)
}

// =============================================================================
// Lock Guard (RAII)
// =============================================================================

/// RAII guard for distributed locks.
/// Automatically releases the lock when dropped.
pub struct LockGuard {
    cache: Arc<Cache>,
    key: String,
    lock_id: String,
    released: bool,
}

impl LockGuard {
    async fn do_release(&mut self) -> AppResult<()> {
        if !self.released {
            self.released = true;
            let released = self.cache.release_lock(&self.key, &self.lock_id).await?;
            if released {
                tracing::debug!(key = %self.key, "Lock released");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DistributedLock for LockGuard {
    async fn release(self: Box<Self>) -> AppResult<()> {
        let mut guard = self;
        guard.do_release().await
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            let cache = self.cache.clone();
            let key = self.key.clone();
            let lock_id = self.lock_id.clone();

            tokio::spawn(async move {
                if let Err(e) = cache.release_lock(&key, &lock_id).await {
                    tracing::error!(key = %key, error = %e, "Failed to release lock on drop");
                } else {
                    tracing::debug!(key = %key, "Lock released on drop");
                }
            });
        }
    }
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::internal(format!("Cache error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_keys_are_prefixed() {
        let id = Uuid::nil();
        assert_eq!(user_key(id), format!("user:{}", id));
        assert_eq!(refresh_key("abc"), "refresh:abc");
    }

    #[test]
    fn test_lock_defaults() {
        assert_eq!(DEFAULT_LOCK_TTL_SECONDS, 30);
        assert_eq!(DEFAULT_LOCK_RETRIES, 10);
        assert_eq!(DEFAULT_LOCK_RETRY_DELAY_MS, 100);
    }
}
