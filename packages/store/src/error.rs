//! Error taxonomy for document-store operations.
//!
//! Mirrors the failure classes the client has to handle: transport problems,
//! authorization rejections, missing documents, and uniqueness conflicts.
//! Call sites surface these as user-visible notifications and keep the last
//! successfully loaded snapshot on screen.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing service could not be reached or answered abnormally.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The caller is not allowed to perform the operation.
    #[error("permission denied")]
    PermissionDenied,

    /// The addressed document does not exist.
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// Document fields could not be decoded into the expected model.
    #[error("malformed document in {collection}: {message}")]
    Malformed { collection: String, message: String },
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn malformed(collection: &str, message: impl Into<String>) -> Self {
        Self::Malformed {
            collection: collection.to_string(),
            message: message.into(),
        }
    }
}
