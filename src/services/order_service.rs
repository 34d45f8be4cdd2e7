//! Orders service. Orders bypass the cache.

use std::sync::Arc;

use jiff::Timestamp;
use validator::Validate;

use crate::error::{AppResult, ResultExt};
use crate::forms::{OrderCreate, OrderGetForClient, OrdersGetForClient};
use crate::models::{CreatedOrder, Order, OrdersPage};
use crate::repositories::OrdersRepository;

#[derive(Clone)]
pub struct OrdersService {
    repo: Arc<dyn OrdersRepository>,
}

impl OrdersService {
    pub fn new(repo: Arc<dyn OrdersRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_order(
        &self,
        form: &OrderCreate,
        now: Timestamp,
    ) -> AppResult<CreatedOrder> {
        form.validate()?;

        let mut order = Order::new(now);
        form.fill(&mut order);

        self.repo
            .create_order(None, &mut order)
            .await
            .context("create order")?;

        tracing::debug!(id = %order.id, user_id = %order.user_id, "Order created");
        Ok(CreatedOrder::from(&order))
    }

    /// One page of a client's orders.
    pub async fn get_orders_for_client(
        &self,
        filter: &OrdersGetForClient,
    ) -> AppResult<OrdersPage> {
        filter.validate()?;
        filter.pagination.validate()?;

        self.repo
            .get_orders_for_client(None, filter)
            .await
            .context("get orders for client")
    }

    pub async fn get_order_for_client(&self, filter: &OrderGetForClient) -> AppResult<Order> {
        filter.validate()?;

        self.repo
            .get_order_for_client(None, filter)
            .await
            .context("get order for client")
    }
}
