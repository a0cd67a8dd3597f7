//! Test helpers: build the router with test collaborators.
//!
//! The chain resolver is swapped for an in-memory key table and storage
//! runs against a tempdir-backed local backend, so the full HTTP pipeline
//! is exercised without a ledger node or object store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_test::TestServer;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use k256::ecdsa::SigningKey;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use imagehost_api::rate_limit::UploadRateLimiter;
use imagehost_api::services::upload::UploadPipeline;
use imagehost_api::setup::routes::setup_routes;
use imagehost_api::state::AppState;
use imagehost_chain::{
    AccountKeySet, AccountResolver, ChainError, PublicKey, SignatureVerifier,
};
use imagehost_core::{Config, StorageBackend};
use imagehost_storage::{DedupStore, LocalStore};

pub const PUBLIC_URL_BASE: &str = "http://localhost:7070/media";

/// Resolver backed by a fixed in-memory account table.
pub struct InMemoryResolver {
    accounts: HashMap<String, AccountKeySet>,
}

#[async_trait]
impl AccountResolver for InMemoryResolver {
    async fn resolve_account(&self, name: &str) -> Result<Option<AccountKeySet>, ChainError> {
        Ok(self.accounts.get(name).cloned())
    }
}

/// An account fixture with one signing key per authority tier.
pub struct TestAccount {
    pub owner_seed: u8,
    pub active_seed: u8,
    pub posting_seed: u8,
}

pub fn public_key_for_seed(seed: u8) -> PublicKey {
    let signing_key = SigningKey::from_slice(&[seed; 32]).unwrap();
    PublicKey::from_verifying_key(signing_key.verifying_key())
}

/// Sign `message` the way a wallet does: 65-byte compact signature over
/// SHA-256, hex encoded.
pub fn sign_compact(seed: u8, message: &[u8]) -> String {
    let signing_key = SigningKey::from_slice(&[seed; 32]).unwrap();
    let (signature, recovery_id) = signing_key
        .sign_digest_recoverable(Sha256::new_with_prefix(message))
        .unwrap();

    let mut raw = Vec::with_capacity(65);
    raw.push(31 + recovery_id.to_byte());
    raw.extend_from_slice(signature.to_bytes().as_slice());
    hex::encode(raw)
}

pub fn envelope(media_type: &str, bytes: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "data": format!("data:{};base64,{}", media_type, BASE64.encode(bytes)),
    })
}

pub fn test_config() -> Config {
    Config {
        server_port: 0,
        environment: "test".to_string(),
        jsonrpc_url: "http://localhost:8091".to_string(),
        resolver_timeout: Duration::from_secs(5),
        address_prefix: "BLT".to_string(),
        max_body_bytes: 10 * 1024 * 1024,
        max_image_bytes: 1024 * 1024,
        rate_limit_points: 69,
        rate_limit_upload_cost: 23,
        rate_limit_window: Duration::from_secs(3600),
        storage_backend: StorageBackend::Local,
        store_timeout: Duration::from_secs(5),
        public_url_base: PUBLIC_URL_BASE.to_string(),
        local_storage_path: None,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
    }
}

/// Test application: server plus owned storage directory.
pub struct TestApp {
    pub server: TestServer,
    pub storage_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn stored_file_count(&self) -> usize {
        std::fs::read_dir(self.storage_dir.path()).unwrap().count()
    }
}

pub async fn setup_test_app(accounts: &[(&str, TestAccount)], config: Config) -> TestApp {
    let accounts = accounts
        .iter()
        .map(|(name, fixture)| {
            (
                name.to_string(),
                AccountKeySet {
                    owner: public_key_for_seed(fixture.owner_seed),
                    active: public_key_for_seed(fixture.active_seed),
                    posting: public_key_for_seed(fixture.posting_seed),
                },
            )
        })
        .collect();

    let verifier = SignatureVerifier::new(Arc::new(InMemoryResolver { accounts }));

    let storage_dir = TempDir::new().unwrap();
    let local = LocalStore::new(storage_dir.path(), PUBLIC_URL_BASE.to_string())
        .await
        .unwrap();
    let store = DedupStore::new(Arc::new(local), config.store_timeout);

    let limiter = UploadRateLimiter::new(config.rate_limit_points, config.rate_limit_window);

    let pipeline = UploadPipeline::new(config.clone(), verifier, store, limiter);
    let state = Arc::new(AppState { config, pipeline });
    let router = setup_routes(&state.config, state.clone());

    TestApp {
        server: TestServer::new(router).unwrap(),
        storage_dir,
    }
}

// ----- Response shapes -----

#[derive(Debug, Deserialize)]
pub struct OkResponse {
    pub status: String,
    pub message: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub stage: String,
    pub recoverable: bool,
    pub retry_after_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub data: ErrorDetail,
}
