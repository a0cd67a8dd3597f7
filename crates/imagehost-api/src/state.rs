//! Application state
//!
//! Everything request handlers need, constructed once at startup and
//! shared behind an `Arc`. The rate limiter's quota table and the dedup
//! store's write locks live inside the pipeline, so their lifecycle is
//! the service's lifecycle — no ambient globals.

use imagehost_core::Config;

use crate::services::upload::UploadPipeline;

pub struct AppState {
    pub config: Config,
    pub pipeline: UploadPipeline,
}
