//! Content hashing and key generation
//!
//! Centralized here so every backend and the dedup layer agree on the
//! addressing scheme.

use ripemd::{Digest as _, Ripemd160};

/// Hex RIPEMD-160 digest of the object bytes.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Ripemd160::digest(bytes))
}

/// Storage key for a content hash and file extension.
pub fn object_key(hash: &str, extension: &str) -> String {
    format!("{hash}.{extension}")
}
