//! In-process datastore.
//!
//! Keeps users and orders in [`DashMap`]s. Transactions stage their writes
//! in a [`MemoryTx`] journal that becomes visible on commit, and order
//! listings page with an opaque cursor instead of an offset.

mod orders;
mod users;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::db::DataStoreError;
use crate::error::{AppError, AppResult};
use crate::models::{Order, User};
use crate::repositories::{
    Base, DataStore, OrdersRepository, Session, SessionKind, TxCallback, TxStarter,
    UserRepository,
};

use self::orders::MemoryOrdersRepository;
use self::users::MemoryUserRepository;

const BACKEND: &str = "memory";

/// Tables shared by the store, its repositories and open transactions.
pub(crate) struct MemoryState {
    connected: AtomicBool,
    /// Held for writing while a commit is applied, for reading by queries.
    visibility: RwLock<()>,
    users: DashMap<String, User>,
    orders: DashMap<String, Order>,
}

impl MemoryState {
    fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            visibility: RwLock::new(()),
            users: DashMap::new(),
            orders: DashMap::new(),
        }
    }

    fn ensure_connected(&self) -> AppResult<()> {
        if self.connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(DataStoreError::NotConnected(BACKEND).into())
        }
    }

    /// Shared view that never observes a half-applied commit.
    fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.visibility
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The journal behind `kind`, which must come from this store.
    fn enlist<'a>(self: &Arc<Self>, kind: &'a mut SessionKind) -> AppResult<&'a mut MemoryTx> {
        let tx = kind.as_memory()?;
        if !Arc::ptr_eq(&tx.state, self) {
            return Err(AppError::Internal {
                source: anyhow::anyhow!("session was started by a different memory datastore"),
            });
        }
        Ok(tx)
    }
}

enum StagedWrite {
    User(User),
    Order(Order),
}

/// Journal of writes staged by one transaction.
pub struct MemoryTx {
    state: Arc<MemoryState>,
    staged: Vec<StagedWrite>,
}

impl MemoryTx {
    fn new(state: Arc<MemoryState>) -> Self {
        Self {
            state,
            staged: Vec::new(),
        }
    }

    /// Apply every staged write in order.
    pub(crate) fn commit(&mut self) -> AppResult<()> {
        self.state.ensure_connected()?;

        let _guard = self
            .state
            .visibility
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let applied = self.staged.len();
        for write in self.staged.drain(..) {
            match write {
                StagedWrite::User(user) => {
                    self.state.users.insert(user.id.clone(), user);
                }
                StagedWrite::Order(order) => {
                    self.state.orders.insert(order.id.clone(), order);
                }
            }
        }
        tracing::debug!(applied, "Memory transaction committed");
        Ok(())
    }

    pub(crate) fn abort(&mut self) {
        let discarded = self.staged.len();
        self.staged.clear();
        tracing::debug!(discarded, "Memory transaction aborted");
    }

    fn stage_user(&mut self, user: User) {
        self.staged.push(StagedWrite::User(user));
    }

    fn stage_order(&mut self, order: Order) {
        self.staged.push(StagedWrite::Order(order));
    }

    /// Latest staged version of a user.
    fn staged_user(&self, id: &str) -> Option<&User> {
        self.staged.iter().rev().find_map(|write| match write {
            StagedWrite::User(user) if user.id == id => Some(user),
            _ => None,
        })
    }

    /// Staged users in write order; later entries supersede earlier ones.
    fn staged_users(&self) -> impl Iterator<Item = &User> {
        self.staged.iter().filter_map(|write| match write {
            StagedWrite::User(user) => Some(user),
            StagedWrite::Order(_) => None,
        })
    }

    fn staged_orders(&self) -> impl Iterator<Item = &Order> {
        self.staged.iter().filter_map(|write| match write {
            StagedWrite::Order(order) => Some(order),
            StagedWrite::User(_) => None,
        })
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Storage key for `id`. Any textual uuid form maps to the simple lowercase key.
fn check_id(entity: &str, id: &str) -> AppResult<String> {
    Uuid::try_parse(id)
        .map(|uuid| uuid.simple().to_string())
        .map_err(|_| AppError::invalid_id(entity, id))
}

/// In-process implementation of every datastore contract.
pub struct MemoryStore {
    state: Arc<MemoryState>,
    users: Arc<MemoryUserRepository>,
    orders: Arc<MemoryOrdersRepository>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let state = Arc::new(MemoryState::new());
        Self {
            users: Arc::new(MemoryUserRepository::new(state.clone())),
            orders: Arc::new(MemoryOrdersRepository::new(state.clone())),
            state,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Base for MemoryStore {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn connect(&self) -> AppResult<()> {
        if !self.state.connected.swap(true, Ordering::AcqRel) {
            tracing::info!(backend = BACKEND, "Datastore connected");
        }
        Ok(())
    }

    async fn close(&self) -> AppResult<()> {
        if self.state.connected.swap(false, Ordering::AcqRel) {
            tracing::info!(backend = BACKEND, "Datastore closed");
        }
        Ok(())
    }
}

#[async_trait]
impl TxStarter for MemoryStore {
    async fn start_session(&self) -> AppResult<(Session, TxCallback)> {
        self.state.ensure_connected()?;
        let session = Session::new(SessionKind::Memory(MemoryTx::new(self.state.clone())));
        Ok((session.clone(), TxCallback::new(session)))
    }
}

impl DataStore for MemoryStore {
    fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn orders_repository(&self) -> Arc<dyn OrdersRepository> {
        self.orders.clone()
    }
}
