//! S3 storage backend
//!
//! Backed by `object_store` so S3-compatible providers (MinIO,
//! DigitalOcean Spaces) work through the same path. Writes use
//! create-if-absent semantics: the backend itself arbitrates racing
//! writers of the same content key.

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, Error as ObjectStoreError, ObjectStore, ObjectStoreExt, PutMode,
    PutOptions, PutPayload,
};

use crate::traits::{ContentStore, StorageError, StorageResult};

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Store {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
    public_url_base: Option<String>,
}

impl S3Store {
    /// Create a new S3Store.
    ///
    /// `public_url_base`, when set, overrides URL construction (CDN in
    /// front of the bucket); otherwise URLs are derived from the endpoint
    /// or the standard AWS form.
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        public_url_base: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Store {
            store,
            bucket,
            region,
            endpoint_url,
            public_url_base,
        })
    }
}

#[async_trait]
impl ContentStore for S3Store {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = Path::from(key);
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::ExistsFailed(e.to_string())),
        }
    }

    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> StorageResult<String> {
        let location = Path::from(key);
        let size = bytes.len();
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutOptions {
            mode: PutMode::Create,
            attributes,
            ..Default::default()
        };

        match self.store.put_opts(&location, PutPayload::from(bytes), opts).await {
            Ok(_) => {
                tracing::info!(
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 write successful"
                );
            }
            // Another writer won the race for the same content; the bytes
            // are identical by construction.
            Err(ObjectStoreError::AlreadyExists { .. }) => {
                tracing::debug!(bucket = %self.bucket, key = %key, "object already present");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 write failed"
                );
                return Err(StorageError::WriteFailed(e.to_string()));
            }
        }

        Ok(self.url_for(key))
    }

    fn url_for(&self, key: &str) -> String {
        if let Some(ref base) = self.public_url_base {
            return format!("{}/{}", base.trim_end_matches('/'), key);
        }
        if let Some(ref endpoint) = self.endpoint_url {
            // Path-style for S3-compatible providers.
            format!("{}/{}/{}", endpoint.trim_end_matches('/'), self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(endpoint: Option<&str>, public_base: Option<&str>) -> S3Store {
        S3Store::new(
            "images".to_string(),
            "us-east-1".to_string(),
            endpoint.map(String::from),
            public_base.map(String::from),
        )
        .unwrap()
    }

    #[test]
    fn test_url_prefers_public_base() {
        let store = store_with(None, Some("https://cdn.example.net/"));
        assert_eq!(
            store.url_for("abc.png"),
            "https://cdn.example.net/abc.png"
        );
    }

    #[test]
    fn test_url_from_custom_endpoint() {
        let store = store_with(Some("http://localhost:9000"), None);
        assert_eq!(
            store.url_for("abc.png"),
            "http://localhost:9000/images/abc.png"
        );
    }

    #[test]
    fn test_url_standard_aws_form() {
        let store = store_with(None, None);
        assert_eq!(
            store.url_for("abc.png"),
            "https://images.s3.us-east-1.amazonaws.com/abc.png"
        );
    }
}
