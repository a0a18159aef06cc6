//! In-process document store

use std::collections::HashMap;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use insta_common::ObjectId;
use tokio::sync::RwLock;

use super::{
    assign_id, Collection, Document, DocumentStore, DocumentStream, Filter, StoreError,
    StoreResult, ID_FIELD,
};

/// Documents held in memory, per collection in insertion order
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`
    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

fn has_id(document: &Document, id: &ObjectId) -> bool {
    document
        .get(ID_FIELD)
        .and_then(|v| v.as_str())
        .is_some_and(|s| ObjectId::parse_str(s).ok().as_ref() == Some(id))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(&self, collection: Collection, id: &ObjectId) -> StoreResult<Document> {
        let collections = self.collections.read().await;
        collections
            .get(&collection)
            .and_then(|documents| documents.iter().find(|d| has_id(d, id)))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn find(&self, collection: Collection, filter: Filter) -> DocumentStream<'_> {
        // Nothing is read until the cursor is first polled
        stream::once(async move {
            let collections = self.collections.read().await;
            let matched: Vec<StoreResult<Document>> = collections
                .get(&collection)
                .map(|documents| {
                    documents
                        .iter()
                        .filter(|d| filter.matches(d))
                        .cloned()
                        .map(Ok)
                        .collect()
                })
                .unwrap_or_default();
            stream::iter(matched)
        })
        .flatten()
        .boxed()
    }

    async fn insert_one(&self, collection: Collection, mut document: Document) -> StoreResult<ObjectId> {
        let id = assign_id(&mut document);

        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();
        if documents.iter().any(|d| has_id(d, &id)) {
            return Err(StoreError::DuplicateKey(id));
        }
        documents.push(document);

        Ok(id)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use serde_json::{json, Value};

    fn document(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find_one() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Users, document(json!({"Name": "n"})))
            .await
            .unwrap();

        let found = store.find_one(Collection::Users, &id).await.unwrap();
        assert_eq!(found["Name"], "n");
        assert_eq!(found[ID_FIELD], id.to_hex());
    }

    #[tokio::test]
    async fn test_collections_are_disjoint() {
        let store = MemoryStore::new();
        let id = store
            .insert_one(Collection::Users, document(json!({})))
            .await
            .unwrap();

        assert!(matches!(
            store.find_one(Collection::Posts, &id).await,
            Err(StoreError::NotFound)
        ));
        assert_eq!(store.len(Collection::Users).await, 1);
        assert_eq!(store.len(Collection::Posts).await, 0);
    }

    #[tokio::test]
    async fn test_zero_id_is_never_found() {
        let store = MemoryStore::new();
        store
            .insert_one(Collection::Users, document(json!({})))
            .await
            .unwrap();
        assert!(store.find_one(Collection::Users, &ObjectId::ZERO).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_client_id_is_rejected() {
        let store = MemoryStore::new();
        let doc = document(json!({"_id": "61680c9492897f0ebd1fbffa"}));
        store.insert_one(Collection::Posts, doc.clone()).await.unwrap();

        let err = store.insert_one(Collection::Posts, doc).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(id) if id.to_hex() == "61680c9492897f0ebd1fbffa"));
        assert_eq!(store.len(Collection::Posts).await, 1);
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order() {
        let store = MemoryStore::new();
        for (caption, owner) in [("a", "u1"), ("b", "u2"), ("c", "u1"), ("d", "u1")] {
            store
                .insert_one(
                    Collection::Posts,
                    document(json!({"Caption": caption, "userid": owner})),
                )
                .await
                .unwrap();
        }

        let found: Vec<Document> = store
            .find(Collection::Posts, Filter::eq("userid", "u1"))
            .try_collect()
            .await
            .unwrap();
        let captions: Vec<&str> = found.iter().filter_map(|d| d["Caption"].as_str()).collect();
        assert_eq!(captions, ["a", "c", "d"]);
    }

    #[tokio::test]
    async fn test_find_on_empty_collection() {
        let store = MemoryStore::new();
        let found: Vec<Document> = store
            .find(Collection::Posts, Filter::eq("userid", "nobody"))
            .try_collect()
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
