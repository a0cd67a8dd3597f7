//! Chain operation errors

use thiserror::Error;

/// Errors from account resolution and signature verification.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("invalid account name: {0}")]
    InvalidAccountName(String),

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("malformed public key: {0}")]
    MalformedKey(String),

    #[error("signature does not match any authority key")]
    KeyMismatch,

    #[error("signature verification failed")]
    InvalidSignature,

    #[error("account lookup timed out")]
    ResolverTimeout,

    #[error("account resolver unavailable: {0}")]
    ResolverUnavailable(String),

    #[error("malformed resolver response: {0}")]
    MalformedResponse(String),
}
