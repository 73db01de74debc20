//! In-process document store used for local runs and tests.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use dashmap::DashSet;
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::RwLock;

use super::{Document, DocumentStore, Fields, PageQuery, is_after, order_key};
use crate::dao::{
    paths::{CollectionPath, DocPath},
    storage::{StorageError, StorageResult},
};

/// Failure raised by the in-memory store when a collection was marked as failing.
#[derive(Debug, Error)]
#[error("injected failure for `{path}`")]
pub struct InjectedFailure {
    path: String,
}

#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    collections: RwLock<HashMap<CollectionPath, BTreeMap<String, Fields>>>,
    failing: DashSet<CollectionPath>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read and write touching `collection` fail until [`Self::heal`] is called.
    pub fn fail_collection(&self, collection: CollectionPath) {
        self.inner.failing.insert(collection);
    }

    /// Clear every injected failure.
    pub fn heal(&self) {
        self.inner.failing.clear();
    }

    fn check(&self, collection: &CollectionPath) -> StorageResult<()> {
        if self.inner.failing.contains(collection) {
            let path = collection.to_string();
            return Err(StorageError::unavailable(
                format!("collection `{path}` unavailable"),
                InjectedFailure { path },
            ));
        }
        Ok(())
    }

    async fn get_document(&self, path: DocPath) -> StorageResult<Option<Document>> {
        self.check(path.collection())?;
        let guard = self.inner.collections.read().await;
        let fields = guard
            .get(path.collection())
            .and_then(|docs| docs.get(path.id()))
            .cloned();
        Ok(fields.map(|fields| Document { path, fields }))
    }

    async fn set_document(&self, path: DocPath, fields: Fields) -> StorageResult<()> {
        self.check(path.collection())?;
        let mut guard = self.inner.collections.write().await;
        guard
            .entry(path.collection().clone())
            .or_default()
            .insert(path.id().to_owned(), fields);
        Ok(())
    }

    async fn update_document(&self, path: DocPath, fields: Fields) -> StorageResult<bool> {
        self.check(path.collection())?;
        let mut guard = self.inner.collections.write().await;
        let Some(existing) = guard
            .get_mut(path.collection())
            .and_then(|docs| docs.get_mut(path.id()))
        else {
            return Ok(false);
        };
        existing.extend(fields);
        Ok(true)
    }

    async fn delete_document(&self, path: DocPath) -> StorageResult<bool> {
        self.check(path.collection())?;
        let mut guard = self.inner.collections.write().await;
        Ok(guard
            .get_mut(path.collection())
            .and_then(|docs| docs.remove(path.id()))
            .is_some())
    }

    async fn list_documents(&self, collection: CollectionPath) -> StorageResult<Vec<Document>> {
        self.check(&collection)?;
        let guard = self.inner.collections.read().await;
        let Some(docs) = guard.get(&collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .map(|(id, fields)| Document {
                path: collection.doc(id.clone()),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn page_documents(
        &self,
        collection: CollectionPath,
        query: PageQuery,
    ) -> StorageResult<Vec<Document>> {
        let mut keyed = self
            .list_documents(collection)
            .await?
            .into_iter()
            .map(|doc| (order_key(&doc.fields, query.order_by), doc))
            .filter(|(key, doc)| match &query.after {
                Some(cursor) => is_after(key, doc.id(), cursor),
                None => true,
            })
            .collect::<Vec<_>>();

        keyed.sort_by(|(a_key, a), (b_key, b)| (a_key, a.id()).cmp(&(b_key, b.id())));
        Ok(keyed
            .into_iter()
            .take(query.limit)
            .map(|(_, doc)| doc)
            .collect())
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, path: DocPath) -> BoxFuture<'static, StorageResult<Option<Document>>> {
        let store = self.clone();
        Box::pin(async move { store.get_document(path).await })
    }

    fn set(&self, path: DocPath, fields: Fields) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.set_document(path, fields).await })
    }

    fn update(&self, path: DocPath, fields: Fields) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.update_document(path, fields).await })
    }

    fn delete(&self, path: DocPath) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_document(path).await })
    }

    fn list(&self, collection: CollectionPath) -> BoxFuture<'static, StorageResult<Vec<Document>>> {
        let store = self.clone();
        Box::pin(async move { store.list_documents(collection).await })
    }

    fn page(
        &self,
        collection: CollectionPath,
        query: PageQuery,
    ) -> BoxFuture<'static, StorageResult<Vec<Document>>> {
        let store = self.clone();
        Box::pin(async move { store.page_documents(collection, query).await })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::dao::doc_store::PageCursor;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = MemoryDocumentStore::new();
        let path = DocPath::team("t1");
        store
            .set(path.clone(), fields(json!({ "name": "Hawks" })))
            .await
            .unwrap();

        let doc = store.get(path).await.unwrap().unwrap();
        assert_eq!(doc.id(), "t1");
        assert_eq!(doc.fields["name"], "Hawks");
    }

    #[tokio::test]
    async fn update_merges_and_reports_missing_documents() {
        let store = MemoryDocumentStore::new();
        let path = DocPath::team_game("t1", "g1");
        assert!(
            !store
                .update(path.clone(), fields(json!({ "score": "1-0" })))
                .await
                .unwrap()
        );

        store
            .set(path.clone(), fields(json!({ "opponent": "Lions", "score": "" })))
            .await
            .unwrap();
        assert!(
            store
                .update(path.clone(), fields(json!({ "score": "1-0" })))
                .await
                .unwrap()
        );

        let doc = store.get(path).await.unwrap().unwrap();
        assert_eq!(doc.fields["opponent"], "Lions");
        assert_eq!(doc.fields["score"], "1-0");
    }

    #[tokio::test]
    async fn list_does_not_descend_into_subcollections() {
        let store = MemoryDocumentStore::new();
        store
            .set(DocPath::team_game("t1", "g1"), fields(json!({})))
            .await
            .unwrap();
        store
            .set(DocPath::stat("t1", "g1", "p1"), fields(json!({ "points": 3 })))
            .await
            .unwrap();

        let games = store
            .list(CollectionPath::team_games("t1"))
            .await
            .unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id(), "g1");
    }

    #[tokio::test]
    async fn page_orders_by_key_and_continues_after_cursor() {
        let store = MemoryDocumentStore::new();
        for (id, name) in [("a", "Lions"), ("b", "Bears"), ("c", "Hawks"), ("d", "Bears")] {
            store
                .set(DocPath::team(id), fields(json!({ "name": name })))
                .await
                .unwrap();
        }

        let first = store
            .page(
                CollectionPath::teams(),
                PageQuery {
                    order_by: "name",
                    after: None,
                    limit: 2,
                },
            )
            .await
            .unwrap();
        let ids = first.iter().map(Document::id).collect::<Vec<_>>();
        assert_eq!(ids, ["b", "d"]);

        let second = store
            .page(
                CollectionPath::teams(),
                PageQuery {
                    order_by: "name",
                    after: Some(PageCursor {
                        key: "Bears".into(),
                        id: "d".into(),
                    }),
                    limit: 2,
                },
            )
            .await
            .unwrap();
        let ids = second.iter().map(Document::id).collect::<Vec<_>>();
        assert_eq!(ids, ["c", "a"]);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_unavailable() {
        let store = MemoryDocumentStore::new();
        store.fail_collection(CollectionPath::teams());
        let err = store.list(CollectionPath::teams()).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable { .. }));

        store.heal();
        assert!(store.list(CollectionPath::teams()).await.is_ok());
    }
}
