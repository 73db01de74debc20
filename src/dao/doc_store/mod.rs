#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::dao::{
    paths::{CollectionPath, DocPath},
    storage::{StorageError, StorageResult},
};

/// Field map of a stored document.
pub type Fields = Map<String, Value>;

/// A document read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: DocPath,
    pub fields: Fields,
}

impl Document {
    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// Decode the document fields into a typed entity.
    pub fn decode<T: DeserializeOwned>(&self) -> StorageResult<T> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|source| StorageError::corrupt(self.path.to_string(), source))
    }

    /// Continuation point positioned right after this document.
    pub fn cursor(&self, order_by: &str) -> PageCursor {
        PageCursor {
            key: order_key(&self.fields, order_by),
            id: self.id().to_owned(),
        }
    }
}

/// Position of the last document of a page: its order key plus id as tie-breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    pub key: String,
    pub id: String,
}

/// Ordered, bounded query over one collection.
#[derive(Debug, Clone)]
pub struct PageQuery {
    /// Field used for ordering; documents are compared by `(field, id)`.
    pub order_by: &'static str,
    /// Start strictly after this position.
    pub after: Option<PageCursor>,
    pub limit: usize,
}

/// Abstraction over the hosted document database.
///
/// Collections are implicit: a document exists in the collection named by its path,
/// and listing a collection never returns documents from nested subcollections.
pub trait DocumentStore: Send + Sync {
    fn get(&self, path: DocPath) -> BoxFuture<'static, StorageResult<Option<Document>>>;
    /// Create or overwrite the document at `path`.
    fn set(&self, path: DocPath, fields: Fields) -> BoxFuture<'static, StorageResult<()>>;
    /// Merge `fields` into an existing document. Returns `false` when it does not exist.
    fn update(&self, path: DocPath, fields: Fields) -> BoxFuture<'static, StorageResult<bool>>;
    /// Returns `false` when there was nothing to delete.
    fn delete(&self, path: DocPath) -> BoxFuture<'static, StorageResult<bool>>;
    fn list(&self, collection: CollectionPath) -> BoxFuture<'static, StorageResult<Vec<Document>>>;
    fn page(
        &self,
        collection: CollectionPath,
        query: PageQuery,
    ) -> BoxFuture<'static, StorageResult<Vec<Document>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// String form of the ordering field; missing or non-scalar values sort first.
pub fn order_key(fields: &Fields, field: &str) -> String {
    match fields.get(field) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Number(value)) => value.to_string(),
        Some(Value::Bool(value)) => value.to_string(),
        _ => String::new(),
    }
}

/// Whether a document at `(key, id)` sorts strictly after `cursor`.
pub fn is_after(key: &str, id: &str, cursor: &PageCursor) -> bool {
    (key, id) > (cursor.key.as_str(), cursor.id.as_str())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn order_key_reads_scalars() {
        let doc = fields(json!({ "name": "Hawks", "number": 5, "nested": {} }));
        assert_eq!(order_key(&doc, "name"), "Hawks");
        assert_eq!(order_key(&doc, "number"), "5");
        assert_eq!(order_key(&doc, "nested"), "");
        assert_eq!(order_key(&doc, "missing"), "");
    }

    #[test]
    fn is_after_breaks_ties_by_id() {
        let cursor = PageCursor {
            key: "Hawks".into(),
            id: "b".into(),
        };
        assert!(!is_after("Hawks", "a", &cursor));
        assert!(!is_after("Hawks", "b", &cursor));
        assert!(is_after("Hawks", "c", &cursor));
        assert!(is_after("Lions", "a", &cursor));
        assert!(!is_after("Bears", "z", &cursor));
    }
}
