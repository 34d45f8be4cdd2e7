//! Backend-agnostic persistence contracts.
//!
//! Every datastore in [`crate::db`] implements all of these traits on one
//! adapter type. Callers that need transactional behavior obtain a
//! [`Session`] from [`TxStarter::start_session`] and pass it explicitly to
//! each repository call; `None` runs the call outside any transaction.

mod session;

pub(crate) use session::SessionKind;
pub use session::{Session, TxCallback, TxControl, finalize};

use std::sync::Arc;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::error::AppResult;
use crate::forms::{OrderGetForClient, OrdersGetForClient, UsersGetByBio};
use crate::models::{Order, OrdersPage, User};

/// Lifecycle of a datastore.
#[async_trait]
pub trait Base: Send + Sync {
    /// Backend name as accepted by the datastore factory.
    fn name(&self) -> &'static str;

    /// Establish the backend connection. Calling it again after success is a no-op.
    async fn connect(&self) -> AppResult<()>;

    /// Release backend resources. Safe after a failed [`Base::connect`].
    async fn close(&self) -> AppResult<()>;
}

/// User persistence.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_users_by_bio(
        &self,
        session: Option<Session>,
        filter: &UsersGetByBio,
    ) -> AppResult<Vec<User>>;

    /// Fails with `NotFound` when absent and `InvalidId` when `id` is malformed.
    async fn get_user_by_id(&self, session: Option<Session>, id: &str) -> AppResult<User>;

    /// Persist a new user and return its assigned id.
    async fn create_user(&self, session: Option<Session>, user: &User) -> AppResult<String>;

    async fn update_user(&self, session: Option<Session>, user: &User) -> AppResult<()>;
}

/// Order persistence. Every read is scoped to the owning user.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OrdersRepository: Send + Sync {
    /// Persist a new order and write its assigned id back into `order`.
    async fn create_order(&self, session: Option<Session>, order: &mut Order) -> AppResult<()>;

    async fn get_orders_for_client(
        &self,
        session: Option<Session>,
        filter: &OrdersGetForClient,
    ) -> AppResult<OrdersPage>;

    /// Fails with `NotFound` unless an order matches both id and owner.
    async fn get_order_for_client(
        &self,
        session: Option<Session>,
        filter: &OrderGetForClient,
    ) -> AppResult<Order>;
}

/// Opens transactional sessions.
#[async_trait]
pub trait TxStarter: Send + Sync {
    /// Begin a session with an open transaction.
    ///
    /// The returned callback must be called exactly once to commit or abort
    /// and to end the session.
    async fn start_session(&self) -> AppResult<(Session, TxCallback)>;
}

/// A complete datastore: lifecycle, transactions and both repositories.
///
/// Repositories are built together with the datastore and shared.
pub trait DataStore: Base + TxStarter {
    fn user_repository(&self) -> Arc<dyn UserRepository>;

    fn orders_repository(&self) -> Arc<dyn OrdersRepository>;
}
