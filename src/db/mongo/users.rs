use async_trait::async_trait;
use mongodb::Collection;
use mongodb::bson::doc;
use mongodb::options::FindOptions;

use super::documents::UserDocument;
use super::{find_all, find_one, parse_object_id};
use crate::error::{AppError, AppResult};
use crate::forms::UsersGetByBio;
use crate::models::User;
use crate::repositories::{Session, UserRepository};

pub(crate) struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub(super) fn new(collection: Collection<UserDocument>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn get_users_by_bio(
        &self,
        session: Option<Session>,
        filter: &UsersGetByBio,
    ) -> AppResult<Vec<User>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1, "_id": 1 })
            .build();
        let documents = find_all(
            &self.collection,
            doc! { "bio": filter.bio.as_str() },
            options,
            session,
            "find users by bio",
        )
        .await?;

        documents.into_iter().map(User::try_from).collect()
    }

    async fn get_user_by_id(&self, session: Option<Session>, id: &str) -> AppResult<User> {
        let oid = parse_object_id("user", id)?;
        find_one(&self.collection, doc! { "_id": oid }, session, "find user")
            .await?
            .ok_or_else(|| AppError::not_found("user", "id", id))?
            .try_into()
    }

    async fn create_user(&self, session: Option<Session>, user: &User) -> AppResult<String> {
        let document = UserDocument::from_user(None, user);
        let inserted = match session {
            Some(session) => {
                let mut guard = session.lock().await;
                self.collection
                    .insert_one(document)
                    .session(guard.as_mongo()?)
                    .await
            }
            None => self.collection.insert_one(document).await,
        }
        .map_err(|e| AppError::database("insert user", e))?;

        let id = inserted
            .inserted_id
            .as_object_id()
            .map(|oid| oid.to_hex())
            .ok_or_else(|| {
                AppError::database(
                    "insert user",
                    anyhow::anyhow!("server returned a non-ObjectId id"),
                )
            })?;

        tracing::debug!(user_id = %id, "User stored");
        Ok(id)
    }

    async fn update_user(&self, session: Option<Session>, user: &User) -> AppResult<()> {
        let oid = parse_object_id("user", &user.id)?;
        let document = UserDocument::from_user(Some(oid), user);
        let filter = doc! { "_id": oid };
        let update = doc! {
            "$set": {
                "name": document.name.as_str(),
                "bio": document.bio.as_str(),
                "updated_at": document.updated_at,
                "created_at": document.created_at,
            }
        };

        let result = match session {
            Some(session) => {
                let mut guard = session.lock().await;
                self.collection
                    .update_one(filter, update)
                    .session(guard.as_mongo()?)
                    .await
            }
            None => self.collection.update_one(filter, update).await,
        }
        .map_err(|e| AppError::database("update user", e))?;

        if result.matched_count == 0 {
            return Err(AppError::not_found("user", "id", &user.id));
        }
        Ok(())
    }
}
