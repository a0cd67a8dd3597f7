//! Upload orchestration
//!
//! Sequences one request through the pipeline:
//! decode -> verify -> quota -> store -> URL. Transitions are strictly
//! sequential; the first failing stage short-circuits the rest and the
//! error carries its stage and taxonomy kind to the response layer. No
//! state is committed before a successful store write, so a failed
//! request leaves nothing behind except its consumed quota points.

use bytes::Bytes;

use imagehost_chain::SignatureVerifier;
use imagehost_core::{decode_envelope, AppError, Config};
use imagehost_storage::{content_hash, object_key, DedupStore};

use crate::error::{app_error_from_chain, app_error_from_storage};
use crate::rate_limit::UploadRateLimiter;

/// The authenticated image-ingestion pipeline.
#[derive(Clone)]
pub struct UploadPipeline {
    config: Config,
    verifier: SignatureVerifier,
    store: DedupStore,
    limiter: UploadRateLimiter,
}

impl UploadPipeline {
    pub fn new(
        config: Config,
        verifier: SignatureVerifier,
        store: DedupStore,
        limiter: UploadRateLimiter,
    ) -> Self {
        UploadPipeline {
            config,
            verifier,
            store,
            limiter,
        }
    }

    /// Run one upload through the pipeline, returning the public
    /// retrieval URL of the stored image.
    #[tracing::instrument(skip(self, signature_hex, envelope), fields(account = %account))]
    pub async fn process(
        &self,
        account: &str,
        signature_hex: &str,
        envelope: &str,
    ) -> Result<String, AppError> {
        let image = decode_envelope(envelope, self.config.max_image_bytes)?;

        let signer = self
            .verifier
            .verify(account, signature_hex, &image.bytes)
            .await
            .map_err(app_error_from_chain)?;
        tracing::debug!(
            account = %account,
            signer = %signer.to_chain_string(&self.config.address_prefix),
            "signature verified"
        );

        let remaining = self
            .limiter
            .consume(account, self.config.rate_limit_upload_cost)
            .await
            .map_err(|rejected| AppError::RateLimitExceeded {
                retry_after: rejected.retry_after,
            })?;

        let hash = content_hash(&image.bytes);
        let key = object_key(&hash, image.format.extension());
        let size_bytes = image.bytes.len();
        let stored = self
            .store
            .store_if_absent(&key, Bytes::from(image.bytes), image.format.content_type())
            .await
            .map_err(app_error_from_storage)?;

        tracing::info!(
            account = %account,
            key = %key,
            size_bytes,
            deduplicated = stored.deduplicated,
            remaining_points = remaining,
            "image upload complete"
        );

        Ok(stored.url)
    }
}
