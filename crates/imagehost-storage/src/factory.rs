//! Storage backend selection from configuration

use std::sync::Arc;

use imagehost_core::{Config, StorageBackend};

use crate::dedup::DedupStore;
use crate::local::LocalStore;
use crate::s3::S3Store;
use crate::traits::{ContentStore, StorageError, StorageResult};

/// Create the configured storage backend, wrapped in the deduplicating
/// write layer.
pub async fn create_store(config: &Config) -> StorageResult<DedupStore> {
    let inner: Arc<dyn ContentStore> = match config.storage_backend {
        StorageBackend::Local => {
            let base_path = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let store = LocalStore::new(base_path, config.public_url_base.clone()).await?;
            Arc::new(store)
        }
        StorageBackend::S3 => {
            let bucket = config.s3_bucket.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_BUCKET not configured".to_string())
            })?;
            let region = config.s3_region.clone().unwrap_or_default();
            let store = S3Store::new(
                bucket,
                region,
                config.s3_endpoint.clone(),
                Some(config.public_url_base.clone()),
            )?;
            Arc::new(store)
        }
    };

    Ok(DedupStore::new(inner, config.store_timeout))
}
