//! # Document-store capability set
//!
//! [`DocumentStore`] is the abstract interface to the backend's document
//! database. The same domain logic (see [`crate::Catalog`]) runs against an
//! in-memory implementation ([`crate::MemoryStore`]) in tests and against the
//! PostgreSQL-backed implementation on the server.
//!
//! Semantics:
//!
//! - `create` with an explicit id is an upsert (set-document semantics); with
//!   `None` the store assigns an id and returns it.
//! - `update` merges a partial patch into an existing document and fails with
//!   `NotFound` when the document is absent.
//! - `query` applies equality filters and returns documents ordered by a
//!   single sort key.
//! - `batch` commits a sequence of writes atomically: all or nothing.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// The field map of a stored document (the document id lives outside it).
pub type Fields = serde_json::Map<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One write inside an atomic batch.
#[derive(Clone, Debug)]
pub enum WriteOp {
    Set {
        collection: String,
        id: String,
        fields: Fields,
    },
    Update {
        collection: String,
        id: String,
        patch: Fields,
    },
    Delete {
        collection: String,
        id: String,
    },
}

/// Async interface to the document database.
pub trait DocumentStore {
    /// Create or overwrite a document. Returns the document id.
    fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        fields: Fields,
    ) -> impl std::future::Future<Output = Result<String, StoreError>>;

    /// Read a single document's fields, `None` when absent.
    fn read(
        &self,
        collection: &str,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Fields>, StoreError>>;

    /// Merge a partial patch into an existing document.
    fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Fields,
    ) -> impl std::future::Future<Output = Result<(), StoreError>>;

    /// Delete a document. Deleting an absent document is not an error.
    fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> impl std::future::Future<Output = Result<(), StoreError>>;

    /// Equality-filtered, ordered query. Returns `(id, fields)` pairs.
    fn query(
        &self,
        collection: &str,
        filters: Vec<(String, Value)>,
        sort_key: &str,
        direction: SortDirection,
    ) -> impl std::future::Future<Output = Result<Vec<(String, Fields)>, StoreError>>;

    /// Commit a batch of writes atomically.
    fn batch(
        &self,
        ops: Vec<WriteOp>,
    ) -> impl std::future::Future<Output = Result<(), StoreError>>;
}

/// Decode a `(id, fields)` pair into a model carrying an `id` field.
pub fn decode<T: DeserializeOwned>(
    collection: &str,
    id: &str,
    fields: &Fields,
) -> Result<T, StoreError> {
    let mut map = fields.clone();
    map.insert("id".to_string(), Value::String(id.to_string()));
    serde_json::from_value(Value::Object(map))
        .map_err(|err| StoreError::malformed(collection, err.to_string()))
}

/// Encode a model into document fields, dropping the external `id`.
pub fn encode<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(mut map)) => {
            map.remove("id");
            Ok(map)
        }
        Ok(other) => Err(StoreError::Backend(format!(
            "document payload must be an object, got {other}"
        ))),
        Err(err) => Err(StoreError::Backend(err.to_string())),
    }
}
