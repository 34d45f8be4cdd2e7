//! MongoDB datastore.
//!
//! Users live in the `user` collection and orders in `orders`. Order
//! listings page with skip/limit. Ids are `ObjectId` hex strings.

mod documents;
mod orders;
mod users;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Document, doc, oid::ObjectId};
use mongodb::options::{
    ClientOptions, FindOptions, ReadConcern, TransactionOptions, WriteConcern,
};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;

use crate::config::settings::DatabaseConfig;
use crate::db::DataStoreError;
use crate::error::{AppError, AppResult};
use crate::repositories::{
    Base, DataStore, OrdersRepository, Session, SessionKind, TxCallback, TxStarter,
    UserRepository,
};

use self::documents::{OrderDocument, UserDocument};
use self::orders::MongoOrdersRepository;
use self::users::MongoUserRepository;

const BACKEND: &str = "mongo";
const USER_COLLECTION: &str = "user";
const ORDERS_COLLECTION: &str = "orders";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// MongoDB implementation of every datastore contract.
pub struct MongoStore {
    client: Client,
    database: Database,
    connect_timeout: Duration,
    connected: AtomicBool,
    users: Arc<MongoUserRepository>,
    orders: Arc<MongoOrdersRepository>,
}

impl MongoStore {
    /// Parse the connection string and prepare the client. No IO happens
    /// until [`Base::connect`].
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        if config.url.trim().is_empty() {
            return Err(DataStoreError::InvalidUrl("url is empty".to_string()).into());
        }
        if config.db.trim().is_empty() {
            return Err(DataStoreError::InvalidDatabaseName.into());
        }

        let connect_timeout = match config.connect_timeout {
            0 => DEFAULT_CONNECT_TIMEOUT,
            secs => Duration::from_secs(secs),
        };

        let mut options = ClientOptions::parse(&config.url)
            .await
            .map_err(|e| DataStoreError::InvalidUrl(e.to_string()))?;
        options.connect_timeout = Some(connect_timeout);
        options.server_selection_timeout = Some(connect_timeout);
        if options.app_name.is_none() {
            options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        }

        let client = Client::with_options(options).map_err(|e| DataStoreError::Connection {
            backend: BACKEND,
            source: e.into(),
        })?;
        let database = client.database(&config.db);

        Ok(Self {
            users: Arc::new(MongoUserRepository::new(
                database.collection::<UserDocument>(USER_COLLECTION),
            )),
            orders: Arc::new(MongoOrdersRepository::new(
                database.collection::<OrderDocument>(ORDERS_COLLECTION),
            )),
            client,
            database,
            connect_timeout,
            connected: AtomicBool::new(false),
        })
    }

    async fn ping(&self) -> AppResult<()> {
        let ping = self.database.run_command(doc! { "ping": 1 });
        tokio::time::timeout(self.connect_timeout, ping)
            .await
            .map_err(|_| DataStoreError::ConnectTimeout {
                backend: BACKEND,
                timeout: self.connect_timeout,
            })?
            .map_err(|e| DataStoreError::Connection {
                backend: BACKEND,
                source: e.into(),
            })?;
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        self.database
            .collection::<Document>(USER_COLLECTION)
            .create_index(IndexModel::builder().keys(doc! { "bio": 1 }).build())
            .await
            .map_err(|e| AppError::database("create user index", e))?;

        self.database
            .collection::<Document>(ORDERS_COLLECTION)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "user_id": 1, "created_at": 1 })
                    .build(),
            )
            .await
            .map_err(|e| AppError::database("create orders index", e))?;
        Ok(())
    }
}

#[async_trait]
impl Base for MongoStore {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn connect(&self) -> AppResult<()> {
        if self.connected.load(Ordering::Acquire) {
            return Ok(());
        }

        self.ping().await?;
        self.ensure_indexes().await?;
        self.connected.store(true, Ordering::Release);

        tracing::info!(
            backend = BACKEND,
            db = %self.database.name(),
            "Datastore connected"
        );
        Ok(())
    }

    async fn close(&self) -> AppResult<()> {
        self.connected.store(false, Ordering::Release);
        self.client.clone().shutdown().await;
        tracing::info!(backend = BACKEND, "Datastore closed");
        Ok(())
    }
}

#[async_trait]
impl TxStarter for MongoStore {
    async fn start_session(&self) -> AppResult<(Session, TxCallback)> {
        let mut session = self
            .client
            .start_session()
            .await
            .map_err(|e| AppError::database("start session", e))?;

        let options = TransactionOptions::builder()
            .write_concern(WriteConcern::majority())
            .read_concern(ReadConcern::snapshot())
            .build();
        session
            .start_transaction()
            .with_options(options)
            .await
            .map_err(|e| AppError::database("start transaction", e))?;

        let session = Session::new(SessionKind::Mongo(session));
        Ok((session.clone(), TxCallback::new(session)))
    }
}

impl DataStore for MongoStore {
    fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn orders_repository(&self) -> Arc<dyn OrdersRepository> {
        self.orders.clone()
    }
}

/// Parse a hex `ObjectId`, reporting malformed input as an invalid id.
fn parse_object_id(entity: &str, id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::invalid_id(entity, id))
}

/// Run a find, inside `session` when given, and collect every document.
async fn find_all<T>(
    collection: &Collection<T>,
    filter: Document,
    options: FindOptions,
    session: Option<Session>,
    operation: &str,
) -> AppResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let result: mongodb::error::Result<Vec<T>> = match session {
        Some(session) => {
            let mut guard = session.lock().await;
            let client_session = guard.as_mongo()?;
            match collection
                .find(filter)
                .with_options(options)
                .session(&mut *client_session)
                .await
            {
                Ok(mut cursor) => cursor.stream(client_session).try_collect().await,
                Err(e) => Err(e),
            }
        }
        None => match collection.find(filter).with_options(options).await {
            Ok(cursor) => cursor.try_collect().await,
            Err(e) => Err(e),
        },
    };

    result.map_err(|e| AppError::database(operation, e))
}

/// Run a single-document lookup, inside `session` when given.
async fn find_one<T>(
    collection: &Collection<T>,
    filter: Document,
    session: Option<Session>,
    operation: &str,
) -> AppResult<Option<T>>
where
    T: DeserializeOwned + Send + Sync,
{
    let result = match session {
        Some(session) => {
            let mut guard = session.lock().await;
            collection.find_one(filter).session(guard.as_mongo()?).await
        }
        None => collection.find_one(filter).await,
    };

    result.map_err(|e| AppError::database(operation, e))
}
