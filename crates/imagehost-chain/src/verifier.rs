//! Signature verification
//!
//! Proves that an upload was authored by the claimed account: recover the
//! public key implied by the signature, check it against the account's
//! resolved authority keys, then explicitly verify the signature against
//! the matched key. Recovery alone can be spoofed; the explicit second
//! verification against a trusted, resolved key closes that gap.

use std::sync::Arc;

use crate::account::is_valid_account_name;
use crate::error::ChainError;
use crate::keys::PublicKey;
use crate::resolver::AccountResolver;
use crate::signature::CompactSignature;

/// Verifies upload signatures against on-chain authority keys.
#[derive(Clone)]
pub struct SignatureVerifier {
    resolver: Arc<dyn AccountResolver>,
}

impl SignatureVerifier {
    pub fn new(resolver: Arc<dyn AccountResolver>) -> Self {
        SignatureVerifier { resolver }
    }

    /// Prove that `signature_hex` over `message` was produced by one of
    /// `account`'s authority keys. Returns the matched key.
    #[tracing::instrument(skip(self, signature_hex, message), fields(account = %account))]
    pub async fn verify(
        &self,
        account: &str,
        signature_hex: &str,
        message: &[u8],
    ) -> Result<PublicKey, ChainError> {
        if !is_valid_account_name(account) {
            return Err(ChainError::InvalidAccountName(account.to_string()));
        }

        let key_set = self
            .resolver
            .resolve_account(account)
            .await?
            .ok_or_else(|| ChainError::UnknownAccount(account.to_string()))?;

        let signature = CompactSignature::from_hex(signature_hex)?;
        let candidate = signature.recover(message)?;

        if !key_set.contains(&candidate) {
            tracing::debug!(account = %account, "recovered key matches no authority tier");
            return Err(ChainError::KeyMismatch);
        }

        if !signature.verify(message, &candidate)? {
            return Err(ChainError::InvalidSignature);
        }

        Ok(candidate)
    }
}
