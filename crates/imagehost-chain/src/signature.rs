//! Compact recoverable signatures
//!
//! The ledger signs the SHA-256 digest of the message and serializes
//! signatures in 65-byte compact form: a recovery header byte
//! (`27 + 4 + recovery_id`, the `+4` marking a compressed public key)
//! followed by the 64-byte `r || s` scalars.

use k256::ecdsa::signature::DigestVerifier;
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::error::ChainError;
use crate::keys::PublicKey;

const COMPACT_LEN: usize = 65;
// 27 base + 4 compressed marker.
const RECOVERY_HEADER_BASE: u8 = 31;

/// A parsed 65-byte compact signature.
#[derive(Debug, Clone)]
pub struct CompactSignature {
    signature: Signature,
    recovery_id: RecoveryId,
}

impl CompactSignature {
    /// Parse the hex form supplied in the request path.
    pub fn from_hex(s: &str) -> Result<Self, ChainError> {
        let raw = hex::decode(s)
            .map_err(|e| ChainError::MalformedSignature(format!("invalid hex: {e}")))?;

        if raw.len() != COMPACT_LEN {
            return Err(ChainError::MalformedSignature(format!(
                "expected {} bytes, got {}",
                COMPACT_LEN,
                raw.len()
            )));
        }

        let rec = raw[0]
            .checked_sub(RECOVERY_HEADER_BASE)
            .filter(|rec| *rec <= 3)
            .ok_or_else(|| {
                ChainError::MalformedSignature(format!("invalid recovery header {}", raw[0]))
            })?;
        let recovery_id = RecoveryId::from_byte(rec).ok_or_else(|| {
            ChainError::MalformedSignature(format!("invalid recovery id {rec}"))
        })?;

        let signature = Signature::from_slice(&raw[1..])
            .map_err(|e| ChainError::MalformedSignature(format!("invalid scalars: {e}")))?;

        Ok(CompactSignature {
            signature,
            recovery_id,
        })
    }

    /// Recover the candidate public key implied by this signature over
    /// `message`. Recovery alone is not proof of authorship; callers must
    /// follow up with `verify` against a trusted key.
    pub fn recover(&self, message: &[u8]) -> Result<PublicKey, ChainError> {
        let key = VerifyingKey::recover_from_digest(
            Sha256::new_with_prefix(message),
            &self.signature,
            self.recovery_id,
        )
        .map_err(|_| {
            ChainError::MalformedSignature("public key recovery failed".to_string())
        })?;
        Ok(PublicKey::from_verifying_key(&key))
    }

    /// Explicit ECDSA verification of this signature over `message`
    /// against `key`.
    pub fn verify(&self, message: &[u8], key: &PublicKey) -> Result<bool, ChainError> {
        let verifying_key = key.verifying_key()?;
        Ok(verifying_key
            .verify_digest(Sha256::new_with_prefix(message), &self.signature)
            .is_ok())
    }
}

/// Test-only signing helper shared across this crate's unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use k256::ecdsa::SigningKey;

    pub(crate) fn sign_compact(seed: u8, message: &[u8]) -> (String, PublicKey) {
        let signing_key = SigningKey::from_slice(&[seed; 32]).unwrap();
        let (signature, recovery_id) = signing_key
            .sign_digest_recoverable(Sha256::new_with_prefix(message))
            .unwrap();

        let mut raw = Vec::with_capacity(COMPACT_LEN);
        raw.push(RECOVERY_HEADER_BASE + recovery_id.to_byte());
        raw.extend_from_slice(signature.to_bytes().as_slice());

        let key = PublicKey::from_verifying_key(signing_key.verifying_key());
        (hex::encode(raw), key)
    }

    pub(crate) fn public_key_for_seed(seed: u8) -> PublicKey {
        let signing_key = SigningKey::from_slice(&[seed; 32]).unwrap();
        PublicKey::from_verifying_key(signing_key.verifying_key())
    }
}

#[cfg(test)]
mod tests {
    use super::testing::sign_compact;
    use super::*;

    #[test]
    fn test_recover_and_verify_round_trip() {
        let message = b"an image payload";
        let (sig_hex, key) = sign_compact(0x42, message);

        let sig = CompactSignature::from_hex(&sig_hex).unwrap();
        let recovered = sig.recover(message).unwrap();
        assert_eq!(recovered, key);
        assert!(sig.verify(message, &key).unwrap());
    }

    #[test]
    fn test_mutated_message_recovers_different_key() {
        let message = b"an image payload";
        let (sig_hex, key) = sign_compact(0x42, message);

        let sig = CompactSignature::from_hex(&sig_hex).unwrap();
        let recovered = sig.recover(b"a different payload").unwrap();
        assert_ne!(recovered, key);
        assert!(!sig.verify(b"a different payload", &key).unwrap());
    }

    #[test]
    fn test_rejects_bad_hex() {
        assert!(matches!(
            CompactSignature::from_hex("zz-not-hex"),
            Err(ChainError::MalformedSignature(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(
            CompactSignature::from_hex(&"ab".repeat(32)),
            Err(ChainError::MalformedSignature(_))
        ));
    }

    #[test]
    fn test_rejects_bad_recovery_header() {
        let (sig_hex, _) = sign_compact(0x42, b"payload");
        let mut raw = hex::decode(sig_hex).unwrap();
        raw[0] = 0x07;
        assert!(matches!(
            CompactSignature::from_hex(&hex::encode(raw)),
            Err(ChainError::MalformedSignature(_))
        ));
    }
}
