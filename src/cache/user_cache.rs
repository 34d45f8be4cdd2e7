//! Typed user cache on top of [`CacheManager`].

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::cache::{CacheError, CacheManager};
use crate::models::{User, user_cache_key};

/// Disposable copies of users, keyed by id.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserCache: Send + Sync {
    /// Fails with [`CacheError::NotFound`] on a miss.
    async fn get_user_by_id(&self, id: &str) -> Result<User, CacheError>;

    async fn set_user(&self, user: &User) -> Result<(), CacheError>;
}

/// [`UserCache`] storing users as JSON.
#[derive(Clone)]
pub struct CacheStore {
    manager: CacheManager,
}

impl CacheStore {
    pub fn new(manager: CacheManager) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl UserCache for CacheStore {
    async fn get_user_by_id(&self, id: &str) -> Result<User, CacheError> {
        let key = user_cache_key(id);
        let bytes = self
            .manager
            .get(&key)
            .await?
            .ok_or(CacheError::NotFound(key))?;

        serde_json::from_slice(&bytes).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    async fn set_user(&self, user: &User) -> Result<(), CacheError> {
        let bytes =
            serde_json::to_vec(user).map_err(|e| CacheError::Serialization(e.to_string()))?;
        self.manager
            .set(&user_cache_key(&user.id), bytes, None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{AppCache, CacheBackend, CacheConfig};
    use jiff::Timestamp;
    use std::sync::Arc;

    struct Unreachable;

    #[async_trait]
    impl AppCache for Unreachable {
        async fn get(&self, _: &str) -> Result<Option<Vec<u8>>, CacheError> {
            Err(CacheError::Connection("connection refused".to_string()))
        }

        async fn set(&self, _: &str, _: Vec<u8>, _: Option<u64>) -> Result<(), CacheError> {
            Err(CacheError::Connection("connection refused".to_string()))
        }
    }

    async fn store() -> CacheStore {
        let config = CacheConfig {
            enabled: true,
            backend: CacheBackend::Memory,
            ..Default::default()
        };
        CacheStore::new(CacheManager::new(config, "users").await.unwrap())
    }

    fn john() -> User {
        User {
            id: "655d8a4d3afea534e56b570e".to_string(),
            name: "John".to_string(),
            bio: "Programmer".to_string(),
            updated_at: Timestamp::from_second(1_700_000_100).unwrap(),
            created_at: Timestamp::from_second(1_700_000_000).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_miss_is_not_found() {
        let cache = store().await;
        let err = cache.get_user_by_id("nobody").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("data:nobody"));
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = store().await;
        cache.set_user(&john()).await.unwrap();
        assert_eq!(cache.get_user_by_id(&john().id).await.unwrap(), john());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_serialization_error() {
        let cache = store().await;
        cache
            .manager
            .set("data:broken", b"{not json".to_vec(), None)
            .await
            .unwrap();
        let err = cache.get_user_by_id("broken").await.unwrap_err();
        assert!(matches!(err, CacheError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_backend_failure_is_not_a_miss() {
        let manager = CacheManager::with_backend(
            Arc::new(Unreachable),
            CacheConfig {
                enabled: true,
                ..Default::default()
            },
        );
        let cache = CacheStore::new(manager);

        let err = cache.get_user_by_id("42").await.unwrap_err();
        assert!(!err.is_not_found());
        assert!(matches!(
            cache.set_user(&john()).await.unwrap_err(),
            CacheError::Connection(_)
        ));
    }
}
