//! Failures of the CouchDB document store.

use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::dao::paths::PathError;

pub type CouchResult<T> = Result<T, CouchDaoError>;

#[derive(Debug, Error)]
pub enum CouchDaoError {
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The configured base URL cannot carry a database path.
    #[error("invalid CouchDB base URL `{url}`")]
    InvalidBaseUrl { url: String },
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request never got a response (connection refused, timeout, ...).
    #[error("CouchDB {method} `{target}` failed")]
    Transport {
        method: Method,
        target: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("CouchDB {method} `{target}` answered {status}")]
    UnexpectedStatus {
        method: Method,
        target: String,
        status: StatusCode,
    },
    #[error("failed to decode CouchDB response for `{target}`")]
    Decode {
        target: String,
        #[source]
        source: reqwest::Error,
    },
    /// A stored `_id` is not a valid document path.
    #[error("invalid document ID `{doc_id}`")]
    InvalidDocId {
        doc_id: String,
        #[source]
        source: PathError,
    },
}
