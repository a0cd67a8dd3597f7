//! Imagehost API
//!
//! The axum service wiring the pipeline together: request handlers, the
//! per-identity rate limiter, the upload orchestrator, application state,
//! and setup/teardown. Exposed as a library so integration tests can
//! build the router with test collaborators.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
