//! Deduplicating write layer
//!
//! Makes the existence-check-then-write pair logically atomic per content
//! key: writers of the same key serialize on a sharded async lock, so two
//! concurrent uploads of identical bytes cannot double-write or corrupt
//! the store. This per-key lock is the only lock in the service held
//! across external I/O. Every backend call is bounded by a timeout so a
//! stalled backend surfaces as an error, never a hang.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::traits::{ContentStore, StorageError, StorageResult};

const WRITE_LOCK_SHARDS: usize = 64;

/// Outcome of a `store_if_absent` call.
#[derive(Debug, Clone)]
pub struct StoredObject {
    /// Stable public URL of the object.
    pub url: String,
    /// Whether the write was skipped because the object already existed.
    pub deduplicated: bool,
}

/// Race-safe deduplicating wrapper around a `ContentStore`.
#[derive(Clone)]
pub struct DedupStore {
    inner: Arc<dyn ContentStore>,
    write_locks: Arc<Vec<Mutex<()>>>,
    op_timeout: Duration,
}

impl DedupStore {
    pub fn new(inner: Arc<dyn ContentStore>, op_timeout: Duration) -> Self {
        let write_locks = Arc::new((0..WRITE_LOCK_SHARDS).map(|_| Mutex::new(())).collect());
        DedupStore {
            inner,
            write_locks,
            op_timeout,
        }
    }

    fn lock_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % WRITE_LOCK_SHARDS
    }

    async fn bounded<T>(
        &self,
        op: impl std::future::Future<Output = StorageResult<T>>,
    ) -> StorageResult<T> {
        timeout(self.op_timeout, op)
            .await
            .map_err(|_| StorageError::Timeout)?
    }

    /// Write `bytes` under `key` unless an object is already present.
    /// Either way the returned URL addresses the stored content.
    pub async fn store_if_absent(
        &self,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        let _guard = self.write_locks[self.lock_index(key)].lock().await;

        if self.bounded(self.inner.exists(key)).await? {
            tracing::debug!(key = %key, "duplicate content, skipping write");
            return Ok(StoredObject {
                url: self.inner.url_for(key),
                deduplicated: true,
            });
        }

        let url = self.bounded(self.inner.put(key, bytes, content_type)).await?;
        Ok(StoredObject {
            url,
            deduplicated: false,
        })
    }

    pub fn url_for(&self, key: &str) -> String {
        self.inner.url_for(key)
    }
}
