//! Storage abstraction trait
//!
//! Defines the `ContentStore` trait all storage backends implement, so the
//! upload pipeline works against any backend without coupling to its
//! details.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("existence check failed: {0}")]
    ExistsFailed(String),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("storage operation timed out")]
    Timeout,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Content-addressed storage backend.
///
/// Keys come from `keys::object_key` and are flat `{hash}.{ext}` names.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Whether an object already exists under `key`.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Write `bytes` under `key` and return the public URL. Objects are
    /// immutable; writing a key that already exists is not an error (the
    /// losing writer of a race observes the same bytes either way).
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> StorageResult<String>;

    /// Public retrieval URL for `key`.
    fn url_for(&self, key: &str) -> String;
}
