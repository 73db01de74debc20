use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::dao::{
    doc_store::{Document, Fields, PageCursor},
    paths::{CollectionPath, DocPath},
};

use super::error::CouchDaoError;

/// Number of documents requested per `_find` round-trip when listing a collection.
pub const LIST_BATCH: usize = 200;

/// Stored shape: the document path is the CouchDB `_id`, the parent collection is
/// indexed so a collection can be listed without scanning its subcollections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub collection: String,
    #[serde(default)]
    pub fields: Fields,
}

impl CouchDocument {
    pub fn new(path: &DocPath, fields: Fields, rev: Option<String>) -> Self {
        Self {
            id: path.to_string(),
            rev,
            collection: path.collection().to_string(),
            fields,
        }
    }
}

impl TryFrom<CouchDocument> for Document {
    type Error = CouchDaoError;

    fn try_from(doc: CouchDocument) -> Result<Self, Self::Error> {
        let path = DocPath::parse(&doc.id).map_err(|source| CouchDaoError::InvalidDocId {
            doc_id: doc.id.clone(),
            source,
        })?;
        Ok(Document {
            path,
            fields: doc.fields,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct FindResponse {
    pub docs: Vec<CouchDocument>,
    #[serde(default)]
    pub bookmark: Option<String>,
}

/// Revision-only projection used before updates and deletes.
#[derive(Debug, Deserialize)]
pub struct RevisionOnly {
    #[serde(rename = "_rev")]
    pub rev: String,
}

/// Mango query listing one collection, continued with a bookmark.
pub fn list_query(collection: &CollectionPath, bookmark: Option<&str>) -> Value {
    let mut query = json!({
        "selector": { "collection": collection.as_str() },
        "limit": LIST_BATCH,
    });
    if let Some(bookmark) = bookmark {
        query["bookmark"] = Value::String(bookmark.to_owned());
    }
    query
}

/// Mango query for one ordered page positioned after `after`.
pub fn page_query(
    collection: &CollectionPath,
    order_by: &str,
    after: Option<&PageCursor>,
    limit: usize,
) -> Value {
    let field = format!("fields.{order_by}");
    let mut selector = json!({ "collection": collection.as_str() });
    if let Some(cursor) = after {
        let cursor_id = collection.doc(cursor.id.clone()).to_string();
        selector["$or"] = json!([
            { field.clone(): { "$gt": cursor.key } },
            { field.clone(): cursor.key, "_id": { "$gt": cursor_id } },
        ]);
    }

    json!({
        "selector": selector,
        "sort": [{ "collection": "asc" }, { field.clone(): "asc" }, { "_id": "asc" }],
        "limit": limit,
    })
}

/// JSON index backing [`page_query`] for one order field.
pub fn order_index(order_by: &str) -> Value {
    json!({
        "index": { "fields": ["collection", format!("fields.{order_by}"), "_id"] },
        "name": format!("collection-{order_by}-idx"),
        "type": "json",
    })
}
