use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::truncate_to_millis;

/// Order entity. Orders are never modified after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub cost: i64,
    pub created_at: Timestamp,
}

impl Order {
    pub fn new(now: Timestamp) -> Self {
        Self {
            created_at: truncate_to_millis(now),
            ..Default::default()
        }
    }
}

/// One page of orders.
///
/// Cursor-paged datastores set `page_state` to the base64 token that resumes
/// the listing; it is `None` on the last page and for offset-paged stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrdersPage {
    pub items: Vec<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_state: Option<String>,
}

/// Result of creating an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedOrder {
    pub id: String,
    pub created_at: Timestamp,
}

impl From<&Order> for CreatedOrder {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            created_at: order.created_at,
        }
    }
}
