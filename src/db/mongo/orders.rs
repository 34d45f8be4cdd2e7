use async_trait::async_trait;
use mongodb::Collection;
use mongodb::bson::doc;
use mongodb::options::FindOptions;

use super::documents::OrderDocument;
use super::{find_all, find_one, parse_object_id};
use crate::error::{AppError, AppResult};
use crate::forms::{OrderGetForClient, OrdersGetForClient};
use crate::models::{Order, OrdersPage};
use crate::repositories::{OrdersRepository, Session};

pub(crate) struct MongoOrdersRepository {
    collection: Collection<OrderDocument>,
}

impl MongoOrdersRepository {
    pub(super) fn new(collection: Collection<OrderDocument>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl OrdersRepository for MongoOrdersRepository {
    async fn create_order(&self, session: Option<Session>, order: &mut Order) -> AppResult<()> {
        let document = OrderDocument::from(&*order);
        let inserted = match session {
            Some(session) => {
                let mut guard = session.lock().await;
                self.collection
                    .insert_one(document)
                    .session(guard.as_mongo()?)
                    .await
            }
            None => self.collection.insert_one(document).await,
        }
        .map_err(|e| AppError::database("insert order", e))?;

        order.id = inserted
            .inserted_id
            .as_object_id()
            .map(|oid| oid.to_hex())
            .ok_or_else(|| {
                AppError::database(
                    "insert order",
                    anyhow::anyhow!("server returned a non-ObjectId id"),
                )
            })?;

        tracing::debug!(order_id = %order.id, user_id = %order.user_id, "Order stored");
        Ok(())
    }

    async fn get_orders_for_client(
        &self,
        session: Option<Session>,
        filter: &OrdersGetForClient,
    ) -> AppResult<OrdersPage> {
        let pagination = &filter.pagination;
        let direction = pagination.sort_to_int();
        let options = FindOptions::builder()
            .sort(doc! { "created_at": direction, "_id": direction })
            .skip(pagination.offset())
            .limit(i64::try_from(pagination.effective_limit()).unwrap_or(i64::MAX))
            .build();

        let documents = find_all(
            &self.collection,
            doc! { "user_id": filter.user_id.as_str() },
            options,
            session,
            "find orders for client",
        )
        .await?;

        Ok(OrdersPage {
            items: documents
                .into_iter()
                .map(Order::try_from)
                .collect::<AppResult<_>>()?,
            page_state: None,
        })
    }

    async fn get_order_for_client(
        &self,
        session: Option<Session>,
        filter: &OrderGetForClient,
    ) -> AppResult<Order> {
        let oid = parse_object_id("order", &filter.order_id)?;
        find_one(
            &self.collection,
            doc! { "_id": oid, "user_id": filter.user_id.as_str() },
            session,
            "find order for client",
        )
        .await?
        .ok_or_else(|| AppError::not_found("order", "id", &filter.order_id))?
        .try_into()
    }
}
