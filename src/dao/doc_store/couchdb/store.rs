use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::dao::{
    doc_store::{Document, DocumentStore, Fields, PageQuery},
    paths::{CollectionPath, DocPath},
    storage::StorageResult,
};

use super::{
    config::CouchConfig,
    error::{CouchDaoError, CouchResult},
    models::{
        CouchDocument, FindResponse, LIST_BATCH, RevisionOnly, list_query, order_index,
        page_query,
    },
};

const FIND: &str = "_find";
const NO_BODY: Option<&()> = None;
const INDEX: &str = "_index";
/// Fields the listings are paged by.
const ORDER_FIELDS: [&str; 2] = ["name", "date"];

#[derive(Clone)]
pub struct CouchDocumentStore {
    client: Client,
    base_url: Arc<Url>,
    database: Arc<str>,
    auth: Option<(Arc<str>, Arc<str>)>,
}

impl CouchDocumentStore {
    /// Establish a connection to CouchDB and ensure the database and its indexes exist.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| CouchDaoError::InvalidBaseUrl {
                url: config.base_url.clone(),
            })?;
        let database = Arc::<str>::from(config.database);
        let auth = config.credentials.map(|credentials| {
            (
                Arc::<str>::from(credentials.username),
                Arc::<str>::from(credentials.password),
            )
        });

        let store = Self {
            client,
            base_url: Arc::new(base_url),
            database,
            auth,
        };

        store.ensure_database().await?;
        store.ensure_indexes().await?;
        Ok(store)
    }

    /// URL of `{base}/{database}/{segment}`; the segment is percent-encoded so
    /// slash-separated document paths stay a single CouchDB `_id`.
    fn url(&self, segment: Option<&str>) -> Url {
        let mut url = (*self.base_url).clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&self.database);
            if let Some(segment) = segment {
                segments.push(segment);
            }
        }
        url
    }

    fn request(&self, method: Method, segment: Option<&str>) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, self.url(segment));
        if let Some((ref user, ref pass)) = self.auth {
            builder.basic_auth(user.as_ref(), Some(pass.as_ref()))
        } else {
            builder
        }
    }

    /// Send a request to `{database}/{segment}`, mapping transport failures.
    async fn send<B>(
        &self,
        method: Method,
        segment: Option<&str>,
        body: Option<&B>,
    ) -> CouchResult<Response>
    where
        B: ?Sized + Serialize,
    {
        let mut builder = self.request(method.clone(), segment);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                method,
                target: self.target(segment),
                source,
            })
    }

    fn target(&self, segment: Option<&str>) -> String {
        match segment {
            Some(segment) => format!("{}/{segment}", self.database),
            None => self.database.to_string(),
        }
    }

    fn unexpected(&self, method: Method, segment: Option<&str>, status: StatusCode) -> CouchDaoError {
        CouchDaoError::UnexpectedStatus {
            method,
            target: self.target(segment),
            status,
        }
    }

    async fn decode<T: DeserializeOwned>(&self, segment: &str, response: Response) -> CouchResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|source| CouchDaoError::Decode {
                target: self.target(Some(segment)),
                source,
            })
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let response = self.send(Method::GET, None, NO_BODY).await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                let created = self.send(Method::PUT, None, NO_BODY).await?;
                // 412: created concurrently by another instance.
                match created.status() {
                    status if status.is_success() => Ok(()),
                    StatusCode::PRECONDITION_FAILED => Ok(()),
                    other => Err(self.unexpected(Method::PUT, None, other)),
                }
            }
            other => Err(self.unexpected(Method::GET, None, other)),
        }
    }

    async fn ensure_indexes(&self) -> CouchResult<()> {
        for field in ORDER_FIELDS {
            let _: Value = self.post_json(INDEX, &order_index(field)).await?;
            debug!(field, "CouchDB index ensured");
        }
        Ok(())
    }

    async fn post_json<T: DeserializeOwned>(&self, segment: &str, body: &Value) -> CouchResult<T> {
        let response = self.send(Method::POST, Some(segment), Some(body)).await?;
        if !response.status().is_success() {
            return Err(self.unexpected(Method::POST, Some(segment), response.status()));
        }
        self.decode(segment, response).await
    }

    async fn get_document<T: DeserializeOwned>(&self, doc_id: &str) -> CouchResult<Option<T>> {
        let response = self.send(Method::GET, Some(doc_id), NO_BODY).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => self.decode(doc_id, response).await.map(Some),
            other => Err(self.unexpected(Method::GET, Some(doc_id), other)),
        }
    }

    async fn put_document(&self, document: &CouchDocument) -> CouchResult<()> {
        let response = self
            .send(Method::PUT, Some(&document.id), Some(document))
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.unexpected(Method::PUT, Some(&document.id), response.status()))
        }
    }

    async fn load(&self, path: DocPath) -> CouchResult<Option<Document>> {
        let doc_id = path.to_string();
        match self.get_document::<CouchDocument>(&doc_id).await? {
            Some(doc) => Ok(Some(doc.try_into()?)),
            None => Ok(None),
        }
    }

    async fn save(&self, path: DocPath, fields: Fields) -> CouchResult<()> {
        let doc_id = path.to_string();
        let rev = self
            .get_document::<RevisionOnly>(&doc_id)
            .await?
            .map(|existing| existing.rev);
        self.put_document(&CouchDocument::new(&path, fields, rev)).await
    }

    async fn merge(&self, path: DocPath, fields: Fields) -> CouchResult<bool> {
        let doc_id = path.to_string();
        let Some(mut existing) = self.get_document::<CouchDocument>(&doc_id).await? else {
            return Ok(false);
        };
        existing.fields.extend(fields);
        self.put_document(&existing).await?;
        Ok(true)
    }

    async fn remove(&self, path: DocPath) -> CouchResult<bool> {
        let doc_id = path.to_string();
        let Some(existing) = self.get_document::<RevisionOnly>(&doc_id).await? else {
            return Ok(false);
        };

        let response = self
            .request(Method::DELETE, Some(&doc_id))
            .query(&[("rev", existing.rev)])
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                method: Method::DELETE,
                target: self.target(Some(&doc_id)),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            other => Err(self.unexpected(Method::DELETE, Some(&doc_id), other)),
        }
    }

    async fn list_collection(&self, collection: CollectionPath) -> CouchResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut bookmark: Option<String> = None;

        loop {
            let payload: FindResponse = self
                .post_json(FIND, &list_query(&collection, bookmark.as_deref()))
                .await?;
            let fetched = payload.docs.len();
            for doc in payload.docs {
                documents.push(doc.try_into()?);
            }

            if fetched < LIST_BATCH {
                break;
            }
            bookmark = payload.bookmark;
            if bookmark.is_none() {
                break;
            }
        }

        Ok(documents)
    }

    async fn page_collection(
        &self,
        collection: CollectionPath,
        query: PageQuery,
    ) -> CouchResult<Vec<Document>> {
        let body = page_query(
            &collection,
            query.order_by,
            query.after.as_ref(),
            query.limit,
        );
        let payload: FindResponse = self.post_json(FIND, &body).await?;
        payload
            .docs
            .into_iter()
            .map(Document::try_from)
            .collect()
    }

    async fn ping(&self) -> CouchResult<()> {
        let response = self.send(Method::GET, None, NO_BODY).await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.unexpected(Method::GET, None, response.status()))
        }
    }
}

impl DocumentStore for CouchDocumentStore {
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
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
