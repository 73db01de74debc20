use mongodb::bson::{Document as BsonDocument, doc};
use serde::{Deserialize, Serialize};

use crate::dao::{
    doc_store::{Document, Fields, PageCursor},
    paths::{CollectionPath, DocPath},
};

use super::error::MongoDaoError;

/// Every path lives in one collection; `collection` holds the parent path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoStoredDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub collection: String,
    #[serde(default)]
    pub fields: Fields,
}

impl MongoStoredDocument {
    pub fn new(path: &DocPath, fields: Fields) -> Self {
        Self {
            id: path.to_string(),
            collection: path.collection().to_string(),
            fields,
        }
    }
}

impl TryFrom<MongoStoredDocument> for Document {
    type Error = MongoDaoError;

    fn try_from(doc: MongoStoredDocument) -> Result<Self, Self::Error> {
        let path = DocPath::parse(&doc.id).map_err(|source| MongoDaoError::InvalidDocId {
            doc_id: doc.id.clone(),
            source,
        })?;
        Ok(Document {
            path,
            fields: doc.fields,
        })
    }
}

pub fn doc_id(path: &DocPath) -> BsonDocument {
    doc! { "_id": path.to_string() }
}

pub fn collection_filter(collection: &CollectionPath) -> BsonDocument {
    doc! { "collection": collection.as_str() }
}

/// Filter selecting the documents of `collection` ordered after `after`.
pub fn page_filter(
    collection: &CollectionPath,
    order_by: &str,
    after: Option<&PageCursor>,
) -> BsonDocument {
    let mut filter = collection_filter(collection);
    if let Some(cursor) = after {
        let field = format!("fields.{order_by}");
        let cursor_id = collection.doc(cursor.id.clone()).to_string();

        let mut greater = BsonDocument::new();
        greater.insert(field.clone(), doc! { "$gt": cursor.key.as_str() });
        let mut tied = BsonDocument::new();
        tied.insert(field, cursor.key.as_str());
        tied.insert("_id", doc! { "$gt": cursor_id });

        filter.insert("$or", vec![greater, tied]);
    }
    filter
}

pub fn page_sort(order_by: &str) -> BsonDocument {
    let mut sort = BsonDocument::new();
    sort.insert(format!("fields.{order_by}"), 1);
    sort.insert("_id", 1);
    sort
}
