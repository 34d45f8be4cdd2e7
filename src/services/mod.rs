//! Service layer for business logic operations.
//!
//! Services validate input, build and mutate entities, and coordinate the
//! repositories with the cache and the message producer.

mod order_service;
pub mod producer;
mod user_service;

pub use order_service::OrdersService;
pub use producer::{Message, MessageProducer, producer_from_config};
pub use user_service::UserService;

use std::sync::Arc;

use crate::cache::UserCache;
use crate::repositories::DataStore;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap since every collaborator is shared through an `Arc`.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub orders: OrdersService,
}

impl Services {
    pub fn new(
        store: &dyn DataStore,
        cache: Arc<dyn UserCache>,
        producer: Arc<dyn MessageProducer>,
    ) -> Self {
        Self {
            users: UserService::new(store.user_repository(), cache, producer),
            orders: OrdersService::new(store.orders_repository()),
        }
    }
}
