/// Pluggable document database backends.
pub mod doc_store;
/// Database model definitions.
pub mod models;
/// Document path contract.
pub mod paths;
/// Typed helpers over [`doc_store::DocumentStore`].
pub mod repository;
/// Storage abstraction layer for database operations.
pub mod storage;
