//! Common test utilities for Insta server integration tests
//!
//! Builds the full router over an in-memory store (or a store that always
//! fails) and drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use futures::stream;
use http_body_util::BodyExt;
use insta_common::ObjectId;
use serde_json::Value;
use tower::ServiceExt;

use insta_server::{
    api,
    codec::DecodePolicy,
    config::Config,
    store::{
        Collection, Document, DocumentStore, DocumentStream, Filter, MemoryStore, StoreError,
        StoreGateway, StoreResult, StoreTimeouts,
    },
};

/// Router plus a handle on the store behind it
pub struct TestApp {
    pub router: Router,
    pub gateway: StoreGateway,
}

impl TestApp {
    /// Router over an empty in-memory store, lenient decoding
    pub fn new() -> Self {
        Self::with_policy(DecodePolicy::Lenient)
    }

    pub fn with_policy(policy: DecodePolicy) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), policy)
    }

    pub fn with_store(store: Arc<dyn DocumentStore>, policy: DecodePolicy) -> Self {
        let gateway = StoreGateway::new(store, StoreTimeouts::default());

        let mut config = Config::default();
        config.codec.decode_policy = policy;

        Self {
            router: api::create_router(gateway.clone(), &config),
            gateway,
        }
    }

    /// Send one request, returning status and raw body
    pub async fn send(&self, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        (status, bytes.to_vec())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self.send(Method::GET, uri, None).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    pub async fn post(&self, uri: &str, body: &str) -> (StatusCode, Value) {
        let (status, body) = self.send(Method::POST, uri, Some(body)).await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

/// How a [`FailingStore`] fails
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Unavailable,
    Query,
}

impl Failure {
    fn error(self) -> StoreError {
        match self {
            Failure::Unavailable => StoreError::Unavailable("connection refused".to_string()),
            Failure::Query => StoreError::Query("unknown operator: $eq".to_string()),
        }
    }
}

/// Store whose every operation fails
pub struct FailingStore(pub Failure);

#[async_trait]
impl DocumentStore for FailingStore {
    async fn find_one(&self, _: Collection, _: &ObjectId) -> StoreResult<Document> {
        Err(self.0.error())
    }

    fn find(&self, _: Collection, _: Filter) -> DocumentStream<'_> {
        Box::pin(stream::iter([Err(self.0.error())]))
    }

    async fn insert_one(&self, _: Collection, _: Document) -> StoreResult<ObjectId> {
        Err(self.0.error())
    }

    async fn ping(&self) -> StoreResult<()> {
        Err(self.0.error())
    }
}
