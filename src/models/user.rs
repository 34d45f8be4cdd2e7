use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::truncate_to_millis;

/// User entity. `id` stays empty until the datastore assigns one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub bio: String,
    pub updated_at: Timestamp,
    pub created_at: Timestamp,
}

impl User {
    /// A not-yet-persisted user stamped with `now`.
    pub fn new(now: Timestamp) -> Self {
        let now = truncate_to_millis(now);
        Self {
            updated_at: now,
            created_at: now,
            ..Default::default()
        }
    }
}

/// Cache key under which a single user is stored.
pub fn user_cache_key(id: &str) -> String {
    format!("data:{id}")
}

/// Result of creating a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedUser {
    pub id: String,
}
