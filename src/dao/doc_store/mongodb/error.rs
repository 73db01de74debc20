use mongodb::error::Error as MongoError;
use thiserror::Error;

use crate::dao::paths::PathError;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to load document `{path}`")]
    Load {
        path: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to save document `{path}`")]
    Save {
        path: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete document `{path}`")]
    Delete {
        path: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to query collection `{collection}`")]
    Query {
        collection: String,
        #[source]
        source: MongoError,
    },
    #[error("invalid document ID `{doc_id}`")]
    InvalidDocId {
        doc_id: String,
        #[source]
        source: PathError,
    },
}
