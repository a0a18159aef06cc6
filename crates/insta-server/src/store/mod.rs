//! Document store gateway
//!
//! Collections of JSON documents addressed by [`ObjectId`], behind the
//! [`DocumentStore`] trait. Handlers talk to a [`StoreGateway`], which adds
//! typed records and per-operation timeouts on top of a backend.
//!
//! Two backends exist:
//!
//! - [`MemoryStore`]: process-local, used by default and in tests
//! - [`PostgresStore`]: JSONB rows in PostgreSQL

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{stream::BoxStream, TryStreamExt};
use insta_common::ObjectId;
use serde_json::Value;
use thiserror::Error;

use crate::codec::{self, Record};
use crate::config::{StoreBackend, StoreConfig};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// A stored document: a JSON object keyed by wire field names
pub type Document = serde_json::Map<String, Value>;

/// Lazy cursor over the results of a filtered find
pub type DocumentStream<'a> = BoxStream<'a, StoreResult<Document>>;

/// Key under which every document carries its identifier
pub const ID_FIELD: &str = "_id";

/// Collections within the configured database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Posts,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "Users",
            Collection::Posts => "Posts",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Equality filter on a single top-level string field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, document: &Document) -> bool {
        matches!(document.get(&self.field), Some(Value::String(v)) if *v == self.value)
    }
}

/// Store operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// No document with the requested id
    #[error("no documents in result")]
    NotFound,

    /// Insert collided with an existing id
    #[error("duplicate key: a document with _id {0} already exists")]
    DuplicateKey(ObjectId),

    /// Malformed query or unreadable result
    #[error("query failed: {0}")]
    Query(String),

    /// Backend could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Operation exceeded its deadline
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    /// Document did not match the record shape
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQL error from the Postgres backend
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound)
    }

    /// Failures of the store itself rather than of the query
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend operations over collections of documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the document with `id`, or [`StoreError::NotFound`]
    async fn find_one(&self, collection: Collection, id: &ObjectId) -> StoreResult<Document>;

    /// Documents matching `filter`, in insertion order
    fn find(&self, collection: Collection, filter: Filter) -> DocumentStream<'_>;

    /// Insert `document`, assigning an id when it has none
    async fn insert_one(&self, collection: Collection, document: Document) -> StoreResult<ObjectId>;

    /// Check that the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}

/// Ensure `document` carries an id, returning it
///
/// An existing, well-formed `_id` is kept; anything else is replaced by a
/// freshly generated id.
pub fn assign_id(document: &mut Document) -> ObjectId {
    let existing = document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .and_then(|s| ObjectId::parse_str(s).ok())
        .filter(|id| !id.is_zero());

    match existing {
        Some(id) => id,
        None => {
            let id = ObjectId::generate();
            document.insert(ID_FIELD.to_string(), Value::String(id.to_hex()));
            id
        },
    }
}

/// Deadlines applied by the gateway
#[derive(Debug, Clone, Copy)]
pub struct StoreTimeouts {
    pub read: Duration,
    pub write: Duration,
}

impl StoreTimeouts {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            read: config.read_timeout(),
            write: config.write_timeout(),
        }
    }
}

impl Default for StoreTimeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(crate::config::DEFAULT_STORE_READ_TIMEOUT_SECS),
            write: Duration::from_secs(crate::config::DEFAULT_STORE_WRITE_TIMEOUT_SECS),
        }
    }
}

/// Shared, typed handle to the document store
#[derive(Clone)]
pub struct StoreGateway {
    store: Arc<dyn DocumentStore>,
    timeouts: StoreTimeouts,
}

impl StoreGateway {
    pub fn new(store: Arc<dyn DocumentStore>, timeouts: StoreTimeouts) -> Self {
        Self { store, timeouts }
    }

    /// Look up a record by id
    pub async fn get_by_id<R: Record>(&self, id: &ObjectId) -> StoreResult<R> {
        let document = bounded(
            "find_one",
            self.timeouts.read,
            self.store.find_one(R::COLLECTION, id),
        )
        .await?;

        Ok(codec::from_document(document)?)
    }

    /// Raw cursor over the documents of `collection` matching `filter`
    pub fn find(&self, collection: Collection, filter: Filter) -> DocumentStream<'_> {
        self.store.find(collection, filter)
    }

    /// Drain a filtered find into typed records
    ///
    /// The whole drain shares one read deadline.
    pub async fn find_all<R: Record>(&self, filter: Filter) -> StoreResult<Vec<R>> {
        let drain = async {
            let mut cursor = self.find(R::COLLECTION, filter);
            let mut records = Vec::new();
            while let Some(document) = cursor.try_next().await? {
                records.push(codec::from_document::<R>(document)?);
            }
            Ok::<_, StoreError>(records)
        };

        bounded("find", self.timeouts.read, drain).await
    }

    /// Insert a record, returning its id
    pub async fn insert<R: Record>(&self, record: &R) -> StoreResult<ObjectId> {
        let document = codec::to_document(record)?;
        bounded(
            "insert_one",
            self.timeouts.write,
            self.store.insert_one(R::COLLECTION, document),
        )
        .await
    }

    pub async fn ping(&self) -> StoreResult<()> {
        bounded("ping", self.timeouts.read, self.store.ping()).await
    }
}

async fn bounded<T, F>(operation: &'static str, after: Duration, fut: F) -> StoreResult<T>
where
    F: std::future::Future<Output = StoreResult<T>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout { operation, after }),
    }
}

/// Build the gateway for the configured backend
///
/// The Postgres backend connects its pool and applies migrations here, once,
/// before the server accepts requests.
pub async fn connect(config: &StoreConfig) -> StoreResult<StoreGateway> {
    let store: Arc<dyn DocumentStore> = match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory document store; data is lost on restart");
            Arc::new(MemoryStore::new())
        },
        StoreBackend::Postgres => {
            let store = PostgresStore::connect(config).await?;
            store.migrate().await?;
            Arc::new(store)
        },
    };

    tracing::info!(
        backend = %config.backend,
        database = %config.database,
        "Document store ready"
    );

    Ok(StoreGateway::new(store, StoreTimeouts::from_config(config)))
}
