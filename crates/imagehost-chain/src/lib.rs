//! Imagehost chain library
//!
//! Everything the service needs to talk about the ledger: account-name
//! syntax, the chain's public key text form, compact recoverable ECDSA
//! signatures, the account resolver collaborator, and the signature
//! verifier that ties them together. No HTTP-server or storage concerns
//! live here.

pub mod account;
pub mod error;
pub mod keys;
pub mod resolver;
pub mod signature;
pub mod verifier;

pub use account::is_valid_account_name;
pub use error::ChainError;
pub use keys::PublicKey;
pub use resolver::{AccountKeySet, AccountResolver, JsonRpcResolver};
pub use signature::CompactSignature;
pub use verifier::SignatureVerifier;
