//! Redis cache implementation using a bb8 connection pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError};

use crate::cache::{AppCache, CacheError};
use crate::config::settings::RedisCacheConfig;

type RedisPool = Pool<Client>;

fn operation_error(e: RedisError) -> CacheError {
    CacheError::Operation(e.to_string())
}

/// Redis-backed cache shared by every instance of the service.
pub struct RedisCache {
    pool: RedisPool,
    namespace: String,
    default_ttl: u64,
}

impl RedisCache {
    /// Build the pool. Keys are namespaced as `{key_prefix}:{cache_name}:{key}`.
    pub async fn new(config: &RedisCacheConfig, cache_name: &str) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.pool_size.max(1))
            .connection_timeout(Duration::from_secs(config.connection_timeout.max(1)))
            .build(client)
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::debug!(url = %config.url, cache_name, "Redis cache pool ready");

        Ok(Self {
            pool,
            namespace: namespace(&config.key_prefix, cache_name),
            default_ttl: config.ttl_seconds,
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    async fn connection(&self) -> Result<PooledConnection<'_, Client>, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }
}

fn namespace(prefix: &str, cache_name: &str) -> String {
    if prefix.is_empty() {
        cache_name.to_string()
    } else {
        format!("{prefix}:{cache_name}")
    }
}

#[async_trait]
impl AppCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut pooled = self.connection().await?;
        let conn: &mut MultiplexedConnection = &mut pooled;
        conn.get(self.key(key)).await.map_err(operation_error)
    }

    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError> {
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);
        let mut pooled = self.connection().await?;
        let conn: &mut MultiplexedConnection = &mut pooled;

        // A zero TTL means the entry never expires.
        if ttl == 0 {
            conn.set::<_, _, ()>(self.key(key), value)
                .await
                .map_err(operation_error)
        } else {
            conn.set_ex::<_, _, ()>(self.key(key), value, ttl)
                .await
                .map_err(operation_error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace() {
        assert_eq!(namespace("lombarter", "users"), "lombarter:users");
        assert_eq!(namespace("", "users"), "users");
    }

    #[tokio::test]
    async fn test_rejects_malformed_url() {
        let config = RedisCacheConfig {
            url: "not a url".to_string(),
            ..Default::default()
        };
        let err = RedisCache::new(&config, "users").await.err().unwrap();
        assert!(matches!(err, CacheError::Connection(_)));
    }
}
