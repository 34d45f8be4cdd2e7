use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::{MemoryState, MemoryTx, check_id, new_id};
use crate::error::{AppError, AppResult};
use crate::forms::{OrderGetForClient, OrdersGetForClient, PageState, Pagination, PaginationError};
use crate::models::{Order, OrdersPage};
use crate::repositories::{OrdersRepository, Session};

pub(crate) struct MemoryOrdersRepository {
    state: Arc<MemoryState>,
}

impl MemoryOrdersRepository {
    pub(super) fn new(state: Arc<MemoryState>) -> Self {
        Self { state }
    }

    /// Every order of `user_id` visible to `tx`, sorted by creation time.
    fn owned_by(&self, tx: Option<&MemoryTx>, user_id: &str, ascending: bool) -> Vec<Order> {
        let mut orders: Vec<Order> = {
            let _visible = self.state.read();
            self.state
                .orders
                .iter()
                .filter(|entry| entry.value().user_id == user_id)
                .map(|entry| entry.value().clone())
                .collect()
        };

        if let Some(tx) = tx {
            orders.extend(tx.staged_orders().filter(|o| o.user_id == user_id).cloned());
        }

        orders.sort_by(|a, b| (a.created_at, &a.id).cmp(&(b.created_at, &b.id)));
        if !ascending {
            orders.reverse();
        }
        orders
    }

    fn page(&self, tx: Option<&MemoryTx>, filter: &OrdersGetForClient) -> AppResult<OrdersPage> {
        let pagination = &filter.pagination;
        let orders = self.owned_by(tx, &filter.user_id, pagination.sort_to_bool());

        let start = match resume_after(&pagination.page_state_bytes)? {
            None => 0,
            Some(last_seen) => orders
                .iter()
                .position(|order| order.id == last_seen)
                .map(|index| index + 1)
                .ok_or_else(|| {
                    PaginationError::InvalidPageState("cursor matches no order".to_string())
                })?,
        };

        let limit = usize::try_from(pagination.effective_limit()).unwrap_or(usize::MAX);
        let end = start.saturating_add(limit).min(orders.len());
        let items = orders[start..end].to_vec();

        let page_state = match items.last() {
            Some(last) if end < orders.len() => Some(cursor_for(last)?),
            _ => None,
        };

        Ok(OrdersPage { items, page_state })
    }

    fn lookup(&self, tx: Option<&MemoryTx>, order_id: &str) -> Option<Order> {
        let staged = tx.and_then(|tx| tx.staged_orders().find(|o| o.id == order_id).cloned());
        staged.or_else(|| {
            let _visible = self.state.read();
            self.state
                .orders
                .get(order_id)
                .map(|entry| entry.value().clone())
        })
    }
}

/// Id of the last order of the previous page, if a cursor was supplied.
fn resume_after(cursor: &[u8]) -> Result<Option<String>, PaginationError> {
    if cursor.is_empty() {
        return Ok(None);
    }
    let id = Uuid::from_slice(cursor)
        .map_err(|e| PaginationError::InvalidPageState(e.to_string()))?;
    Ok(Some(id.simple().to_string()))
}

fn cursor_for(order: &Order) -> AppResult<String> {
    let id = Uuid::try_parse(&order.id)
        .map_err(|_| AppError::invalid_id("order", &order.id))?;
    let mut next = Pagination::default();
    next.set_page_state(PageState::Raw(id.as_bytes().to_vec()))?;
    Ok(next.page_state)
}

#[async_trait]
impl OrdersRepository for MemoryOrdersRepository {
    async fn create_order(&self, session: Option<Session>, order: &mut Order) -> AppResult<()> {
        self.state.ensure_connected()?;
        order.id = new_id();

        match session {
            Some(session) => {
                let mut guard = session.lock().await;
                self.state.enlist(&mut guard)?.stage_order(order.clone());
            }
            None => {
                self.state.orders.insert(order.id.clone(), order.clone());
            }
        }

        tracing::debug!(order_id = %order.id, user_id = %order.user_id, "Order stored");
        Ok(())
    }

    async fn get_orders_for_client(
        &self,
        session: Option<Session>,
        filter: &OrdersGetForClient,
    ) -> AppResult<OrdersPage> {
        self.state.ensure_connected()?;

        match session {
            Some(session) => {
                let mut guard = session.lock().await;
                let tx = self.state.enlist(&mut guard)?;
                self.page(Some(&*tx), filter)
            }
            None => self.page(None, filter),
        }
    }

    async fn get_order_for_client(
        &self,
        session: Option<Session>,
        filter: &OrderGetForClient,
    ) -> AppResult<Order> {
        self.state.ensure_connected()?;
        let key = check_id("order", &filter.order_id)?;

        let found = match session {
            Some(session) => {
                let mut guard = session.lock().await;
                let tx = self.state.enlist(&mut guard)?;
                self.lookup(Some(&*tx), &key)
            }
            None => self.lookup(None, &key),
        };

        found
            .filter(|order| order.user_id == filter.user_id)
            .ok_or_else(|| AppError::not_found("order", "id", &filter.order_id))
    }
}
