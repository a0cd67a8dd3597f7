//! Error types module
//!
//! The upload pipeline's failure taxonomy, unified under `AppError`. Every
//! variant self-describes how it should be presented at the request
//! boundary: HTTP status, machine-readable code, whether the caller may
//! retry, and the log level it should be reported at. Internal causes
//! (crypto library errors, I/O details) are logged but never leaked
//! verbatim to the caller.

use std::time::Duration;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors like validation failures
    Debug,
    /// Recoverable issues like quota exhaustion
    Warn,
    /// Unexpected failures
    Error,
}

/// Pipeline stage an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Decode,
    Verify,
    Quota,
    Store,
    Request,
}

impl ErrorStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorStage::Decode => "decode",
            ErrorStage::Verify => "verify",
            ErrorStage::Quota => "quota",
            ErrorStage::Store => "store",
            ErrorStage::Request => "request",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("payload too large: {actual} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { actual: usize, limit: usize },

    #[error("invalid account name: {0}")]
    InvalidAccountName(String),

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("signature does not match any authority key of the claimed account")]
    SignatureKeyMismatch,

    #[error("signature verification failed")]
    InvalidSignature,

    #[error("rate limit exceeded")]
    RateLimitExceeded { retry_after: Duration },

    #[error("content store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("account resolver unavailable: {0}")]
    ResolverUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Static metadata per variant: (http_status, error_code, recoverable, sensitive, log_level).
fn static_metadata(err: &AppError) -> (u16, &'static str, bool, bool, LogLevel) {
    match err {
        AppError::MalformedPayload(_) => (400, "MALFORMED_PAYLOAD", false, false, LogLevel::Debug),
        AppError::PayloadTooLarge { .. } => {
            (413, "PAYLOAD_TOO_LARGE", false, false, LogLevel::Debug)
        }
        AppError::InvalidAccountName(_) => {
            (400, "INVALID_ACCOUNT_NAME", false, false, LogLevel::Debug)
        }
        AppError::UnknownAccount(_) => (404, "UNKNOWN_ACCOUNT", false, false, LogLevel::Debug),
        AppError::MalformedSignature(_) => {
            (400, "MALFORMED_SIGNATURE", false, false, LogLevel::Debug)
        }
        AppError::SignatureKeyMismatch => {
            (401, "SIGNATURE_KEY_MISMATCH", false, false, LogLevel::Debug)
        }
        AppError::InvalidSignature => (401, "INVALID_SIGNATURE", false, false, LogLevel::Debug),
        AppError::RateLimitExceeded { .. } => {
            (429, "RATE_LIMIT_EXCEEDED", true, false, LogLevel::Warn)
        }
        AppError::StoreUnavailable(_) => (503, "STORE_UNAVAILABLE", true, true, LogLevel::Error),
        // Resolver timeouts and transport failures wear the UNKNOWN_ACCOUNT
        // code but are retryable, unlike a definitive miss.
        AppError::ResolverUnavailable(_) => (503, "UNKNOWN_ACCOUNT", true, true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", false, true, LogLevel::Error),
    }
}

impl AppError {
    pub fn http_status_code(&self) -> u16 {
        static_metadata(self).0
    }

    pub fn error_code(&self) -> &'static str {
        static_metadata(self).1
    }

    /// Whether the caller may safely retry the request.
    pub fn is_recoverable(&self) -> bool {
        static_metadata(self).2
    }

    /// Whether the internal message must be hidden from the caller.
    pub fn is_sensitive(&self) -> bool {
        static_metadata(self).3
    }

    pub fn log_level(&self) -> LogLevel {
        static_metadata(self).4
    }

    /// Pipeline stage this error is attributed to.
    pub fn stage(&self) -> ErrorStage {
        match self {
            AppError::MalformedPayload(_) | AppError::PayloadTooLarge { .. } => ErrorStage::Decode,
            AppError::InvalidAccountName(_)
            | AppError::UnknownAccount(_)
            | AppError::MalformedSignature(_)
            | AppError::SignatureKeyMismatch
            | AppError::InvalidSignature
            | AppError::ResolverUnavailable(_) => ErrorStage::Verify,
            AppError::RateLimitExceeded { .. } => ErrorStage::Quota,
            AppError::StoreUnavailable(_) => ErrorStage::Store,
            AppError::Internal(_) => ErrorStage::Request,
        }
    }

    /// Retry-after hint, present only for quota failures.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            AppError::RateLimitExceeded { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// Client-facing message. Sensitive variants get a generic message;
    /// the internal detail stays in the logs.
    pub fn client_message(&self) -> String {
        match self {
            AppError::StoreUnavailable(_) => "content store unavailable, retry later".to_string(),
            AppError::ResolverUnavailable(_) => {
                "account lookup failed, retry later".to_string()
            }
            AppError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}
