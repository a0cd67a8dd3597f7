//! Application setup and initialization
//!
//! All initialization logic lives here, extracted from main.rs: build the
//! collaborators from configuration, assemble the pipeline and state, and
//! produce the router.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};

use imagehost_chain::{JsonRpcResolver, SignatureVerifier};
use imagehost_core::Config;
use imagehost_storage::create_store;

use crate::rate_limit::UploadRateLimiter;
use crate::services::upload::UploadPipeline;
use crate::state::AppState;

/// Initialize the entire application.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration.
    config.validate().context("configuration validation failed")?;

    crate::telemetry::init_telemetry();
    tracing::info!("configuration loaded and validated");

    let resolver = JsonRpcResolver::new(
        config.jsonrpc_url.clone(),
        config.address_prefix.clone(),
        config.resolver_timeout,
    )
    .map_err(|e| anyhow::anyhow!("failed to build account resolver: {e}"))?;
    let verifier = SignatureVerifier::new(Arc::new(resolver));

    let store = create_store(&config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to initialize storage: {e}"))?;

    let limiter = UploadRateLimiter::new(config.rate_limit_points, config.rate_limit_window);

    let pipeline = UploadPipeline::new(config.clone(), verifier, store, limiter);
    let state = Arc::new(AppState { config, pipeline });

    let router = routes::setup_routes(&state.config, state.clone());

    Ok((state, router))
}
