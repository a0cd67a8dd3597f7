//! Chain public keys
//!
//! The ledger's text form for a public key is an address prefix (e.g.
//! `BLT`) followed by base58 of the 33-byte SEC1 compressed point with the
//! first four bytes of its RIPEMD-160 digest appended as a checksum.

use std::fmt;

use k256::ecdsa::VerifyingKey;
use ripemd::{Digest as _, Ripemd160};

use crate::error::ChainError;

const COMPRESSED_POINT_LEN: usize = 33;
const CHECKSUM_LEN: usize = 4;

/// A secp256k1 public key in compressed SEC1 form.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; COMPRESSED_POINT_LEN]);

impl PublicKey {
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(true);
        let mut buf = [0u8; COMPRESSED_POINT_LEN];
        buf.copy_from_slice(point.as_bytes());
        PublicKey(buf)
    }

    pub fn verifying_key(&self) -> Result<VerifyingKey, ChainError> {
        VerifyingKey::from_sec1_bytes(&self.0)
            .map_err(|_| ChainError::MalformedKey("not a valid curve point".to_string()))
    }

    /// Parse the ledger's text form, checking prefix and checksum.
    pub fn from_chain_string(prefix: &str, s: &str) -> Result<Self, ChainError> {
        let body = s.strip_prefix(prefix).ok_or_else(|| {
            ChainError::MalformedKey(format!("key does not carry the {prefix} prefix"))
        })?;

        let raw = bs58::decode(body)
            .into_vec()
            .map_err(|e| ChainError::MalformedKey(format!("invalid base58: {e}")))?;

        if raw.len() != COMPRESSED_POINT_LEN + CHECKSUM_LEN {
            return Err(ChainError::MalformedKey(format!(
                "expected {} bytes, got {}",
                COMPRESSED_POINT_LEN + CHECKSUM_LEN,
                raw.len()
            )));
        }

        let (point, checksum) = raw.split_at(COMPRESSED_POINT_LEN);
        let digest = Ripemd160::digest(point);
        if digest[..CHECKSUM_LEN] != checksum[..] {
            return Err(ChainError::MalformedKey("checksum mismatch".to_string()));
        }

        let mut buf = [0u8; COMPRESSED_POINT_LEN];
        buf.copy_from_slice(point);
        let key = PublicKey(buf);
        // Reject points not on the curve up front.
        key.verifying_key()?;
        Ok(key)
    }

    pub fn to_chain_string(&self, prefix: &str) -> String {
        let digest = Ripemd160::digest(self.0);
        let mut raw = Vec::with_capacity(COMPRESSED_POINT_LEN + CHECKSUM_LEN);
        raw.extend_from_slice(&self.0);
        raw.extend_from_slice(&digest[..CHECKSUM_LEN]);
        format!("{}{}", prefix, bs58::encode(raw).into_string())
    }

    pub fn as_bytes(&self) -> &[u8; COMPRESSED_POINT_LEN] {
        &self.0
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}
