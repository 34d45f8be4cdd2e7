//! Order forms.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::forms::Pagination;
use crate::models::Order;

/// Input for creating an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,

    #[validate(range(min = 1, message = "cost must be greater than 0"))]
    pub cost: i64,
}

impl OrderCreate {
    pub fn fill(&self, order: &mut Order) {
        order.user_id = self.user_id.clone();
        order.cost = self.cost;
    }
}

/// Filter for listing the orders of one client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OrdersGetForClient {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,

    #[serde(default)]
    pub pagination: Pagination,
}

/// Filter for a single order owned by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OrderGetForClient {
    #[validate(length(min = 1, message = "order_id is required"))]
    pub order_id: String,

    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
}
