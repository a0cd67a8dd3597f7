//! Health and CORS probe handlers

use axum::Json;
use serde_json::Value;

use crate::error::Envelope;

/// `GET /healthz` — liveness probe.
pub async fn health() -> Json<Envelope<Value>> {
    Json(Envelope::ok(Value::Null))
}

/// `GET /test_cors` — historical CORS probe kept for client compatibility.
pub async fn test_cors() -> Json<Envelope<Value>> {
    Json(Envelope::ok(Value::Null))
}
