use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, IndexModel, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoStoredDocument, collection_filter, doc_id, page_filter, page_sort},
};
use crate::dao::{
    doc_store::{Document, DocumentStore, Fields, PageQuery},
    paths::{CollectionPath, DocPath},
    storage::StorageResult,
};

const DOCUMENT_COLLECTION_NAME: &str = "documents";
/// Fields the listings are paged by.
const ORDER_FIELDS: [&str; 2] = ["name", "date"];

#[derive(Clone)]
pub struct MongoDocumentStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = establish_connection(&self.config).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoDocumentStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) = establish_connection(&config).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.collection().await;
        for field in ORDER_FIELDS {
            let mut keys = doc! { "collection": 1 };
            keys.insert(format!("fields.{field}"), 1);
            keys.insert("_id", 1);
            let name = format!("collection_{field}_idx");
            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().name(Some(name.clone())).build())
                .build();

            collection
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: DOCUMENT_COLLECTION_NAME,
                    index: name,
                    source,
                })?;
        }
        Ok(())
    }

    async fn collection(&self) -> Collection<MongoStoredDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoStoredDocument>(DOCUMENT_COLLECTION_NAME)
    }

    async fn load(&self, path: DocPath) -> MongoResult<Option<Document>> {
        let stored = self
            .collection()
            .await
            .find_one(doc_id(&path))
            .await
            .map_err(|source| MongoDaoError::Load {
                path: path.to_string(),
                source,
            })?;
        stored.map(Document::try_from).transpose()
    }

    async fn save(&self, path: DocPath, fields: Fields) -> MongoResult<()> {
        let stored = MongoStoredDocument::new(&path, fields);
        self.collection()
            .await
            .replace_one(doc_id(&path), &stored)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::Save {
                path: path.to_string(),
                source,
            })?;
        Ok(())
    }

    async fn merge(&self, path: DocPath, fields: Fields) -> MongoResult<bool> {
        let collection = self.collection().await;
        let existing = collection
            .find_one(doc_id(&path))
            .await
            .map_err(|source| MongoDaoError::Load {
                path: path.to_string(),
                source,
            })?;
        let Some(mut stored) = existing else {
            return Ok(false);
        };

        stored.fields.extend(fields);
        let result = collection
            .replace_one(doc_id(&path), &stored)
            .await
            .map_err(|source| MongoDaoError::Save {
                path: path.to_string(),
                source,
            })?;
        Ok(result.matched_count > 0)
    }

    async fn remove(&self, path: DocPath) -> MongoResult<bool> {
        let result = self
            .collection()
            .await
            .delete_one(doc_id(&path))
            .await
            .map_err(|source| MongoDaoError::Delete {
                path: path.to_string(),
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn list_collection(&self, collection: CollectionPath) -> MongoResult<Vec<Document>> {
        let query_error = |source: mongodb::error::Error| MongoDaoError::Query {
            collection: collection.to_string(),
            source,
        };
        let stored: Vec<MongoStoredDocument> = self
            .collection()
            .await
            .find(collection_filter(&collection))
            .sort(doc! { "_id": 1 })
            .await
            .map_err(query_error)?
            .try_collect()
            .await
            .map_err(query_error)?;

        stored.into_iter().map(Document::try_from).collect()
    }

    async fn page_collection(
        &self,
        collection: CollectionPath,
        query: PageQuery,
    ) -> MongoResult<Vec<Document>> {
        let query_error = |source: mongodb::error::Error| MongoDaoError::Query {
            collection: collection.to_string(),
            source,
        };
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let stored: Vec<MongoStoredDocument> = self
            .collection()
            .await
            .find(page_filter(&collection, query.order_by, query.after.as_ref()))
            .sort(page_sort(query.order_by))
            .limit(limit)
            .await
            .map_err(query_error)?
            .try_collect()
            .await
            .map_err(query_error)?;

        stored.into_iter().map(Document::try_from).collect()
    }
}

impl DocumentStore for MongoDocumentStore {
    fn get(&self, path: DocPath) -> BoxFuture<'static, StorageResult<Option<Document>>> {
        let store = self.clone();
        Box::pin(async move { store.load(path).await.map_err(Into::into) })
    }

    fn set(&self, path: DocPath, fields: Fields) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save(path, fields).await.map_err(Into::into) })
    }

    fn update(&self, path: DocPath, fields: Fields) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.merge(path, fields).await.map_err(Into::into) })
    }

    fn delete(&self, path: DocPath) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.remove(path).await.map_err(Into::into) })
    }

    fn list(&self, collection: CollectionPath) -> BoxFuture<'static, StorageResult<Vec<Document>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_collection(collection)
                .await
                .map_err(Into::into)
        })
    }

    fn page(
        &self,
        collection: CollectionPath,
        query: PageQuery,
    ) -> BoxFuture<'static, StorageResult<Vec<Document>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .page_collection(collection, query)
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move { inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move { inner.reconnect().await.map_err(Into::into) })
    }
}
