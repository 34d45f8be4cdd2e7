//! Storage documents and their conversion to domain models.

use jiff::Timestamp;
use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{Order, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    pub updated_at: DateTime,
    pub created_at: DateTime,
}

impl UserDocument {
    /// Document for `user` under the given id; `None` lets the server assign one.
    pub fn from_user(id: Option<ObjectId>, user: &User) -> Self {
        Self {
            id,
            name: user.name.clone(),
            bio: user.bio.clone(),
            updated_at: to_bson(user.updated_at),
            created_at: to_bson(user.created_at),
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = AppError;

    fn try_from(document: UserDocument) -> AppResult<Self> {
        Ok(User {
            id: document.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: document.name,
            bio: document.bio,
            updated_at: to_timestamp(document.updated_at)?,
            created_at: to_timestamp(document.created_at)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct OrderDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub cost: i64,
    pub created_at: DateTime,
}

impl From<&Order> for OrderDocument {
    fn from(order: &Order) -> Self {
        Self {
            id: None,
            user_id: order.user_id.clone(),
            cost: order.cost,
            created_at: to_bson(order.created_at),
        }
    }
}

impl TryFrom<OrderDocument> for Order {
    type Error = AppError;

    fn try_from(document: OrderDocument) -> AppResult<Self> {
        Ok(Order {
            id: document.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: document.user_id,
            cost: document.cost,
            created_at: to_timestamp(document.created_at)?,
        })
    }
}

/// BSON dates carry millisecond precision; finer digits are dropped.
fn to_bson(timestamp: Timestamp) -> DateTime {
    DateTime::from_millis(timestamp.as_millisecond())
}

fn to_timestamp(value: DateTime) -> AppResult<Timestamp> {
    Timestamp::from_millisecond(value.timestamp_millis())
        .map_err(|e| AppError::database("decode timestamp", e))
}
