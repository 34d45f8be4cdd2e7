//! User service for business logic operations.
//!
//! Reads go through the user cache first; updates write the cache before
//! the repository and then announce the change on the bus.

use std::sync::Arc;

use jiff::Timestamp;
use validator::Validate;

use crate::cache::UserCache;
use crate::error::{AppError, AppResult, ResultExt};
use crate::forms::{UserCreate, UserUpdate, UsersGetByBio};
use crate::models::topics::NOTIFICATION_TOPIC;
use crate::models::{CreatedUser, User};
use crate::repositories::UserRepository;
use crate::services::producer::{Message, MessageProducer};

/// User service for handling user-related business logic.
///
/// Every collaborator sits behind an `Arc`, so cloning is cheap.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    cache: Arc<dyn UserCache>,
    producer: Arc<dyn MessageProducer>,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        cache: Arc<dyn UserCache>,
        producer: Arc<dyn MessageProducer>,
    ) -> Self {
        Self {
            repo,
            cache,
            producer,
        }
    }

    /// Users whose bio equals `filter.bio`. Never cached.
    pub async fn get_users_by_bio(&self, filter: &UsersGetByBio) -> AppResult<Vec<User>> {
        filter.validate()?;

        self.repo
            .get_users_by_bio(None, filter)
            .await
            .context("get users by bio")
    }

    /// Cache-aside read.
    ///
    /// Cache failures never fail the call: a miss or a broken cache falls
    /// back to the repository, and the result is cached on a best-effort basis.
    pub async fn get_user_by_id(&self, id: &str) -> AppResult<User> {
        match self.cache.get_user_by_id(id).await {
            Ok(user) => return Ok(user),
            Err(e) if e.is_not_found() => {}
            Err(e) => tracing::error!(id = %id, error = %e, "Failed to read user from cache"),
        }

        let user = self
            .repo
            .get_user_by_id(None, id)
            .await
            .context("get user by id")?;

        if let Err(e) = self.cache.set_user(&user).await {
            tracing::error!(id = %id, error = %e, "Failed to populate user cache");
        }

        Ok(user)
    }

    pub async fn create_user(&self, form: &UserCreate, now: Timestamp) -> AppResult<CreatedUser> {
        form.validate()?;

        let mut user = User::new(now);
        form.fill(&mut user);

        let id = self
            .repo
            .create_user(None, &user)
            .await
            .context("create user")?;

        tracing::debug!(id = %id, "User created");
        Ok(CreatedUser { id })
    }

    /// Apply a partial update.
    ///
    /// The cache is written before the repository and a cache failure aborts
    /// the update. A publish failure is returned after the user has already
    /// been persisted; nothing is rolled back.
    pub async fn update_user(&self, form: &UserUpdate, now: Timestamp) -> AppResult<()> {
        form.validate()?;

        let mut user = self
            .repo
            .get_user_by_id(None, &form.id)
            .await
            .context("get user by id")?;

        form.fill(&mut user, now);

        self.cache
            .set_user(&user)
            .await
            .map_err(|source| AppError::Cache {
                operation: "set user".to_string(),
                source,
            })?;

        self.repo
            .update_user(None, &user)
            .await
            .context("update user")?;

        tracing::debug!(id = %user.id, "Publishing user update");
        let message = Message::new(NOTIFICATION_TOPIC, format!("User {:?} updated", user.id));
        self.producer
            .write(message)
            .await
            .context("publish user update")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{
        CacheBackend, CacheConfig, CacheError, CacheManager, CacheStore, MockUserCache,
    };
    use crate::db::memory::MemoryStore;
    use crate::repositories::{Base, DataStore, MockUserRepository};
    use crate::services::producer::{LogProducer, MockMessageProducer};
    use mockall::predicate::eq;

    const ID: &str = "655d8a4d3afea534e56b570e";

    fn at(second: i64) -> Timestamp {
        Timestamp::from_second(second).unwrap()
    }

    fn john() -> User {
        User {
            id: ID.to_string(),
            name: "John".to_string(),
            bio: "Programmer".to_string(),
            updated_at: at(1_000),
            created_at: at(1_000),
        }
    }

    fn service(
        repo: MockUserRepository,
        cache: MockUserCache,
        producer: MockMessageProducer,
    ) -> UserService {
        UserService::new(Arc::new(repo), Arc::new(cache), Arc::new(producer))
    }

    fn promotion() -> UserUpdate {
        UserUpdate {
            id: ID.to_string(),
            name: None,
            bio: Some("Senior Programmer".to_string()),
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_repository() {
        let mut cache = MockUserCache::new();
        cache
            .expect_get_user_by_id()
            .with(eq(ID))
            .times(1)
            .returning(|_| Ok(john()));

        // No expectations: any repository call panics.
        let svc = service(MockUserRepository::new(), cache, MockMessageProducer::new());
        assert_eq!(svc.get_user_by_id(ID).await.unwrap(), john());
    }

    #[tokio::test]
    async fn test_cache_miss_reads_repository_and_populates() {
        let mut cache = MockUserCache::new();
        cache
            .expect_get_user_by_id()
            .times(1)
            .returning(|id| Err(CacheError::NotFound(id.to_string())));
        cache
            .expect_set_user()
            .withf(|user| user.id == ID)
            .times(1)
            .returning(|_| Ok(()));

        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_id()
            .withf(|session, id| session.is_none() && id == ID)
            .times(1)
            .returning(|_, _| Ok(john()));

        let svc = service(repo, cache, MockMessageProducer::new());
        assert_eq!(svc.get_user_by_id(ID).await.unwrap(), john());
    }

    #[tokio::test]
    async fn test_broken_cache_is_tolerated_on_read() {
        let mut cache = MockUserCache::new();
        cache
            .expect_get_user_by_id()
            .returning(|_| Err(CacheError::Connection("refused".to_string())));
        cache
            .expect_set_user()
            .returning(|_| Err(CacheError::Connection("refused".to_string())));

        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_id().returning(|_, _| Ok(john()));

        let svc = service(repo, cache, MockMessageProducer::new());
        assert_eq!(svc.get_user_by_id(ID).await.unwrap().name, "John");
    }

    #[tokio::test]
    async fn test_repository_error_is_wrapped() {
        let mut cache = MockUserCache::new();
        cache
            .expect_get_user_by_id()
            .returning(|id| Err(CacheError::NotFound(id.to_string())));

        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_id()
            .returning(|_, id| Err(AppError::not_found("user", "id", id)));

        let svc = service(repo, cache, MockMessageProducer::new());
        let err = svc.get_user_by_id(ID).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().starts_with("get user by id: "));
    }

    #[tokio::test]
    async fn test_validation_happens_before_io() {
        let svc = service(
            MockUserRepository::new(),
            MockUserCache::new(),
            MockMessageProducer::new(),
        );

        let bad_update = UserUpdate {
            bio: Some("x".to_string()),
            ..promotion()
        };
        let err = svc.update_user(&bad_update, at(2)).await.unwrap_err();
        assert!(err.is_validation());

        let bad_create = UserCreate {
            name: "Jo".to_string(),
            bio: None,
        };
        let err = svc.create_user(&bad_create, at(2)).await.unwrap_err();
        assert!(err.is_validation());

        let bad_filter = UsersGetByBio { bio: String::new() };
        let err = svc.get_users_by_bio(&bad_filter).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_cache_failure_aborts_update_before_repository_write() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_id().returning(|_, _| Ok(john()));
        repo.expect_update_user().never();

        let mut cache = MockUserCache::new();
        cache
            .expect_set_user()
            .returning(|_| Err(CacheError::Operation("OOM".to_string())));

        let svc = service(repo, cache, MockMessageProducer::new());
        let err = svc.update_user(&promotion(), at(2)).await.unwrap_err();
        assert!(matches!(err, AppError::Cache { .. }));
    }

    #[tokio::test]
    async fn test_update_publishes_after_persisting() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_id().returning(|_, _| Ok(john()));
        repo.expect_update_user()
            .withf(|_, user| user.bio == "Senior Programmer" && user.updated_at == at(2))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut cache = MockUserCache::new();
        cache.expect_set_user().times(1).returning(|_| Ok(()));

        let mut producer = MockMessageProducer::new();
        producer
            .expect_write()
            .withf(|message| {
                message.topic == NOTIFICATION_TOPIC
                    && message.value == format!("User \"{ID}\" updated").into_bytes()
            })
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(repo, cache, producer);
        svc.update_user(&promotion(), at(2)).await.unwrap();
    }

    #[tokio::test]
    async fn test_cached_user_matches_millisecond_store() {
        use std::sync::Mutex;

        let stored = Arc::new(Mutex::new(None::<User>));
        let cached = Arc::new(Mutex::new(None::<User>));

        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_id().returning(|_, _| Ok(john()));
        let sink = stored.clone();
        repo.expect_update_user().returning(move |_, user| {
            let millis = user.updated_at.as_millisecond();
            let persisted = User {
                updated_at: Timestamp::from_millisecond(millis).unwrap(),
                ..user.clone()
            };
            *sink.lock().unwrap() = Some(persisted);
            Ok(())
        });

        let mut cache = MockUserCache::new();
        let sink = cached.clone();
        cache.expect_set_user().times(1).returning(move |user| {
            *sink.lock().unwrap() = Some(user.clone());
            Ok(())
        });

        let mut producer = MockMessageProducer::new();
        producer.expect_write().returning(|_| Ok(()));

        let svc = service(repo, cache, producer);
        let now = Timestamp::new(1_700_000_000, 123_456_789).unwrap();
        svc.update_user(&promotion(), now).await.unwrap();

        let stored = stored.lock().unwrap().clone().unwrap();
        let cached = cached.lock().unwrap().clone().unwrap();
        assert_eq!(cached, stored);
        assert_eq!(cached.updated_at.subsec_nanosecond(), 123_000_000);
    }

    #[tokio::test]
    async fn test_publish_failure_is_returned_after_persisting() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user_by_id().returning(|_, _| Ok(john()));
        repo.expect_update_user().times(1).returning(|_, _| Ok(()));

        let mut cache = MockUserCache::new();
        cache.expect_set_user().returning(|_| Ok(()));

        let mut producer = MockMessageProducer::new();
        producer.expect_write().returning(|message| {
            Err(AppError::Publish {
                topic: message.topic,
                source: anyhow::anyhow!("broker down"),
            })
        });

        let svc = service(repo, cache, producer);
        let err = svc.update_user(&promotion(), at(2)).await.unwrap_err();
        assert!(err.to_string().contains("broker down"));
    }

    #[tokio::test]
    async fn test_end_to_end_on_memory_datastore() {
        let store = MemoryStore::new();
        store.connect().await.unwrap();

        let cache_config = CacheConfig {
            enabled: true,
            backend: CacheBackend::Memory,
            ..Default::default()
        };
        let manager = CacheManager::new(cache_config, "users").await.unwrap();
        let cache = CacheStore::new(manager);
        let svc = UserService::new(
            store.user_repository(),
            Arc::new(cache.clone()),
            Arc::new(LogProducer::new()),
        );

        let created = svc
            .create_user(
                &UserCreate {
                    name: "John".to_string(),
                    bio: Some("Programmer".to_string()),
                },
                at(1_000),
            )
            .await
            .unwrap();

        let fetched = svc.get_user_by_id(&created.id).await.unwrap();
        assert_eq!(fetched.name, "John");
        assert_eq!(fetched.bio, "Programmer");
        assert_eq!(cache.get_user_by_id(&created.id).await.unwrap(), fetched);

        let update = UserUpdate {
            id: created.id.clone(),
            name: None,
            bio: Some("Senior Programmer".to_string()),
        };
        svc.update_user(&update, at(2_000)).await.unwrap();

        let updated = svc.get_user_by_id(&created.id).await.unwrap();
        assert_eq!(updated.name, "John");
        assert_eq!(updated.bio, "Senior Programmer");
        assert_eq!(updated.updated_at, at(2_000));
        assert_eq!(updated.created_at, at(1_000));

        let by_bio = svc
            .get_users_by_bio(&UsersGetByBio {
                bio: "Senior Programmer".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(by_bio, vec![updated]);
    }
}
