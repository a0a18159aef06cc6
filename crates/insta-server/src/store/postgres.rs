//! PostgreSQL document store
//!
//! Every document is one row of the `documents` table, keyed by database
//! name, collection and id, with the document itself in a JSONB column.
//! A `BIGSERIAL` sequence column keeps finds in insertion order.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use insta_common::ObjectId;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;

use super::{
    assign_id, Collection, Document, DocumentStore, DocumentStream, Filter, StoreError,
    StoreResult,
};
use crate::config::StoreConfig;

const FIND_ONE_SQL: &str = r#"
    SELECT body
    FROM documents
    WHERE database_name = $1 AND collection = $2 AND id = $3
"#;

const FIND_SQL: &str = r#"
    SELECT body
    FROM documents
    WHERE database_name = $1 AND collection = $2 AND body ->> $3 = $4
    ORDER BY seq
"#;

const INSERT_SQL: &str = r#"
    INSERT INTO documents (database_name, collection, id, body)
    VALUES ($1, $2, $3, $4)
"#;

/// Document store backed by a shared connection pool
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    database: String,
}

impl PostgresStore {
    /// Open the connection pool described by `config`
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout())
            .connect(&config.url)
            .await
            .map_err(classify)?;

        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Document store connection pool created"
        );

        Ok(Self::from_pool(pool, config.database.clone()))
    }

    pub fn from_pool(pool: PgPool, database: impl Into<String>) -> Self {
        Self {
            pool,
            database: database.into(),
        }
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("Document store migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Separate connectivity failures from query failures
fn classify(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        },
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => StoreError::Query(err.to_string()),
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn find_one(&self, collection: Collection, id: &ObjectId) -> StoreResult<Document> {
        let row = sqlx::query_scalar::<_, Json<Document>>(FIND_ONE_SQL)
            .bind(&self.database)
            .bind(collection.name())
            .bind(id.to_hex())
            .fetch_optional(&self.pool)
            .await
            .map_err(classify)?;

        row.map(|Json(document)| document).ok_or(StoreError::NotFound)
    }

    fn find(&self, collection: Collection, filter: Filter) -> DocumentStream<'_> {
        sqlx::query_scalar::<_, Json<Document>>(FIND_SQL)
            .bind(&self.database)
            .bind(collection.name())
            .bind(filter.field)
            .bind(filter.value)
            .fetch(&self.pool)
            .map_ok(|Json(document)| document)
            .map_err(classify)
            .boxed()
    }

    async fn insert_one(&self, collection: Collection, mut document: Document) -> StoreResult<ObjectId> {
        let id = assign_id(&mut document);

        let result = sqlx::query(INSERT_SQL)
            .bind(&self.database)
            .bind(collection.name())
            .bind(id.to_hex())
            .bind(Json(&document))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(id),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::DuplicateKey(id))
            },
            Err(err) => Err(classify(err)),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(classify)
    }
}
