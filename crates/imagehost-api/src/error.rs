//! HTTP error response conversion
//!
//! Wraps `AppError` for axum (orphan rules) and renders the service's
//! response envelope: `{status, message, data}` with `status` of `ok` or
//! `error` at the application level, plus a transport status code mapped
//! from the error kind. Rate-limited responses carry a `Retry-After`
//! header.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;

use imagehost_chain::ChainError;
use imagehost_core::{AppError, LogLevel};
use imagehost_storage::StorageError;

/// Application-level response envelope shared by success and failure.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope {
            status: "ok",
            message: "success".to_string(),
            data,
        }
    }
}

/// Machine-readable error detail carried in the envelope's `data`.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub stage: &'static str,
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

/// Wrapper type for AppError to implement IntoResponse.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        ApiError(app_error_from_chain(err))
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError(app_error_from_storage(err))
    }
}

pub fn app_error_from_chain(err: ChainError) -> AppError {
    match err {
        ChainError::InvalidAccountName(name) => AppError::InvalidAccountName(name),
        ChainError::UnknownAccount(name) => AppError::UnknownAccount(name),
        ChainError::MalformedSignature(msg) | ChainError::MalformedKey(msg) => {
            AppError::MalformedSignature(msg)
        }
        ChainError::KeyMismatch => AppError::SignatureKeyMismatch,
        ChainError::InvalidSignature => AppError::InvalidSignature,
        ChainError::ResolverTimeout => {
            AppError::ResolverUnavailable("account lookup timed out".to_string())
        }
        ChainError::ResolverUnavailable(msg) | ChainError::MalformedResponse(msg) => {
            AppError::ResolverUnavailable(msg)
        }
    }
}

pub fn app_error_from_storage(err: StorageError) -> AppError {
    match err {
        StorageError::InvalidKey(key) => {
            AppError::Internal(format!("generated invalid storage key: {key}"))
        }
        other => AppError::StoreUnavailable(other.to_string()),
    }
}

/// JSON body extractor that renders rejections in the service envelope
/// instead of axum's default plain-text response.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeJson<T>(pub T);

impl<T, S> FromRequest<S> for EnvelopeJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ApiError(AppError::MalformedPayload(format!(
                    "invalid request body: {}",
                    rejection.body_text()
                )))
            })?;
        Ok(EnvelopeJson(inner))
    }
}

fn log_error(error: &AppError) {
    let stage = error.stage().as_str();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, stage = stage, "upload rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, stage = stage, "upload rejected");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, stage = stage, "upload failed");
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.0;
        log_error(&error);

        let status = StatusCode::from_u16(error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let retry_after = error.retry_after();

        let body = Envelope {
            status: "error",
            message: error.client_message(),
            data: ErrorDetail {
                code: error.error_code(),
                stage: error.stage().as_str(),
                recoverable: error.is_recoverable(),
                retry_after_secs: retry_after.map(|d| d.as_secs().max(1)),
            },
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(retry_after) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&retry_after.as_secs().max(1).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_chain_error_mapping() {
        assert!(matches!(
            app_error_from_chain(ChainError::KeyMismatch),
            AppError::SignatureKeyMismatch
        ));
        assert!(matches!(
            app_error_from_chain(ChainError::ResolverTimeout),
            AppError::ResolverUnavailable(_)
        ));
        assert!(matches!(
            app_error_from_chain(ChainError::UnknownAccount("bob".into())),
            AppError::UnknownAccount(_)
        ));
    }

    #[test]
    fn test_storage_error_mapping() {
        assert!(matches!(
            app_error_from_storage(StorageError::Timeout),
            AppError::StoreUnavailable(_)
        ));
        assert!(matches!(
            app_error_from_storage(StorageError::InvalidKey("..".into())),
            AppError::Internal(_)
        ));
    }

    #[test]
    fn test_retry_after_floor_is_one_second() {
        let err = AppError::RateLimitExceeded {
            retry_after: Duration::from_millis(200),
        };
        assert_eq!(err.retry_after().map(|d| d.as_secs().max(1)), Some(1));
    }
}
