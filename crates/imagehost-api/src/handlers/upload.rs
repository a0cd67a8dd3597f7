//! Upload image handler
//!
//! Thin transport layer over `UploadPipeline`: pulls the claimed account
//! and signature from the path, the encoded envelope from the JSON body,
//! and renders the envelope response.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::{ApiError, Envelope, EnvelopeJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadBody {
    /// `data:image/<fmt>;base64,...` envelope.
    pub data: String,
}

/// `POST /{account}/{signature}`
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Path((account, signature)): Path<(String, String)>,
    EnvelopeJson(body): EnvelopeJson<UploadBody>,
) -> Result<impl IntoResponse, ApiError> {
    let url = state
        .pipeline
        .process(&account, &signature, &body.data)
        .await?;

    Ok(Json(Envelope::ok(url)))
}
