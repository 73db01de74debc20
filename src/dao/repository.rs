//! Typed access to the document store.
//!
//! Entities are (de)serialized through serde so the services only ever see
//! [`Record`]s carrying a document id next to the decoded data.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::dao::{
    doc_store::{DocumentStore, Fields, PageCursor, PageQuery},
    paths::{CollectionPath, DocPath},
    storage::{StorageError, StorageResult},
};

/// A decoded document together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub id: String,
    pub data: T,
}

/// One ordered page plus the cursor of its last document.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub records: Vec<Record<T>>,
    pub last: Option<PageCursor>,
}

/// Encode an entity into the field map stored at `path`.
pub fn to_fields<T: Serialize>(path: &DocPath, value: &T) -> StorageResult<Fields> {
    match serde_json::to_value(value) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(StorageError::corrupt(
            path.to_string(),
            <serde_json::Error as serde::ser::Error>::custom("entity is not a JSON object"),
        )),
        Err(source) => Err(StorageError::corrupt(path.to_string(), source)),
    }
}

pub async fn fetch<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: DocPath,
) -> StorageResult<Option<Record<T>>> {
    match store.get(path).await? {
        Some(document) => Ok(Some(Record {
            data: document.decode()?,
            id: document.id().to_owned(),
        })),
        None => Ok(None),
    }
}

/// Every document of `collection`, decoded.
pub async fn list<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: CollectionPath,
) -> StorageResult<Vec<Record<T>>> {
    store
        .list(collection)
        .await?
        .into_iter()
        .map(|document| {
            Ok(Record {
                data: document.decode()?,
                id: document.id().to_owned(),
            })
        })
        .collect()
}

pub async fn page<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: CollectionPath,
    query: PageQuery,
) -> StorageResult<Page<T>> {
    let order_by = query.order_by;
    let documents = store.page(collection, query).await?;
    let last = documents.last().map(|document| document.cursor(order_by));
    let records = documents
        .into_iter()
        .map(|document| {
            Ok(Record {
                data: document.decode()?,
                id: document.id().to_owned(),
            })
        })
        .collect::<StorageResult<Vec<_>>>()?;
    Ok(Page { records, last })
}

/// Create or overwrite the document at `path`.
pub async fn put<T: Serialize>(
    store: &dyn DocumentStore,
    path: DocPath,
    value: &T,
) -> StorageResult<()> {
    let fields = to_fields(&path, value)?;
    store.set(path, fields).await
}

/// Add a document with a generated id and return that id.
pub async fn insert<T: Serialize>(
    store: &dyn DocumentStore,
    collection: &CollectionPath,
    value: &T,
) -> StorageResult<String> {
    let path = collection.new_doc();
    let id = path.id().to_owned();
    put(store, path, value).await?;
    Ok(id)
}

/// Merge an entity into an existing document. Returns `false` when it does not exist.
pub async fn merge<T: Serialize>(
    store: &dyn DocumentStore,
    path: DocPath,
    value: &T,
) -> StorageResult<bool> {
    let fields = to_fields(&path, value)?;
    store.update(path, fields).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{doc_store::memory::MemoryDocumentStore, models::TeamEntity};

    fn team(name: &str) -> TeamEntity {
        TeamEntity {
            name: name.into(),
            sport: "Basketball".into(),
            city: "Atlanta".into(),
        }
    }

    #[tokio::test]
    async fn insert_then_fetch_returns_record() {
        let store = MemoryDocumentStore::new();
        let id = insert(&store, &CollectionPath::teams(), &team("Hawks"))
            .await
            .unwrap();
        assert_eq!(id.len(), 20);

        let record = fetch::<TeamEntity>(&store, DocPath::team(&id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.data, team("Hawks"));
    }

    #[tokio::test]
    async fn page_reports_cursor_of_last_record() {
        let store = MemoryDocumentStore::new();
        for name in ["Lions", "Bears", "Hawks"] {
            insert(&store, &CollectionPath::teams(), &team(name))
                .await
                .unwrap();
        }

        let page = page::<TeamEntity>(
            &store,
            CollectionPath::teams(),
            PageQuery {
                order_by: "name",
                after: None,
                limit: 2,
            },
        )
        .await
        .unwrap();
        let names = page
            .records
            .iter()
            .map(|record| record.data.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Bears", "Hawks"]);
        assert_eq!(page.last.unwrap().key, "Hawks");
    }

    #[tokio::test]
    async fn decode_failure_is_reported_as_corrupt() {
        let store = MemoryDocumentStore::new();
        let path = DocPath::team("broken");
        let mut fields = Fields::new();
        fields.insert("name".into(), Value::Bool(true));
        store.set(path.clone(), fields).await.unwrap();

        let err = fetch::<TeamEntity>(&store, path).await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }
}
