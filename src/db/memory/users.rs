use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::{MemoryState, MemoryTx, check_id, new_id};
use crate::error::{AppError, AppResult};
use crate::forms::UsersGetByBio;
use crate::models::User;
use crate::repositories::{Session, UserRepository};

pub(crate) struct MemoryUserRepository {
    state: Arc<MemoryState>,
}

impl MemoryUserRepository {
    pub(super) fn new(state: Arc<MemoryState>) -> Self {
        Self { state }
    }

    fn committed(&self, id: &str) -> Option<User> {
        let _visible = self.state.read();
        self.state.users.get(id).map(|entry| entry.value().clone())
    }

    fn lookup(&self, tx: Option<&MemoryTx>, id: &str) -> Option<User> {
        tx.and_then(|tx| tx.staged_user(id).cloned())
            .or_else(|| self.committed(id))
    }

    fn by_bio(&self, tx: Option<&MemoryTx>, bio: &str) -> Vec<User> {
        let mut matched: HashMap<String, User> = {
            let _visible = self.state.read();
            self.state
                .users
                .iter()
                .filter(|entry| entry.value().bio == bio)
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect()
        };

        if let Some(tx) = tx {
            for user in tx.staged_users() {
                if user.bio == bio {
                    matched.insert(user.id.clone(), user.clone());
                } else {
                    matched.remove(&user.id);
                }
            }
        }

        let mut users: Vec<User> = matched.into_values().collect();
        users.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        users
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn get_users_by_bio(
        &self,
        session: Option<Session>,
        filter: &UsersGetByBio,
    ) -> AppResult<Vec<User>> {
        self.state.ensure_connected()?;

        match session {
            Some(session) => {
                let mut guard = session.lock().await;
                let tx = self.state.enlist(&mut guard)?;
                Ok(self.by_bio(Some(&*tx), &filter.bio))
            }
            None => Ok(self.by_bio(None, &filter.bio)),
        }
    }

    async fn get_user_by_id(&self, session: Option<Session>, id: &str) -> AppResult<User> {
        self.state.ensure_connected()?;
        let key = check_id("user", id)?;

        let found = match session {
            Some(session) => {
                let mut guard = session.lock().await;
                let tx = self.state.enlist(&mut guard)?;
                self.lookup(Some(&*tx), &key)
            }
            None => self.lookup(None, &key),
        };

        found.ok_or_else(|| AppError::not_found("user", "id", id))
    }

    async fn create_user(&self, session: Option<Session>, user: &User) -> AppResult<String> {
        self.state.ensure_connected()?;

        let id = new_id();
        let record = User {
            id: id.clone(),
            ..user.clone()
        };

        match session {
            Some(session) => {
                let mut guard = session.lock().await;
                self.state.enlist(&mut guard)?.stage_user(record);
            }
            None => {
                self.state.users.insert(id.clone(), record);
            }
        }

        tracing::debug!(user_id = %id, "User stored");
        Ok(id)
    }

    async fn update_user(&self, session: Option<Session>, user: &User) -> AppResult<()> {
        self.state.ensure_connected()?;
        let key = check_id("user", &user.id)?;
        let record = User {
            id: key.clone(),
            ..user.clone()
        };

        match session {
            Some(session) => {
                let mut guard = session.lock().await;
                let tx = self.state.enlist(&mut guard)?;
                if self.lookup(Some(&*tx), &key).is_none() {
                    return Err(AppError::not_found("user", "id", &user.id));
                }
                tx.stage_user(record);
            }
            None => match self.state.users.get_mut(&key) {
                Some(mut entry) => *entry = record,
                None => return Err(AppError::not_found("user", "id", &user.id)),
            },
        }

        Ok(())
    }
}
