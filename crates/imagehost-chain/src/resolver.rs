//! Account resolution
//!
//! The identity resolver collaborator: given an account name, produce the
//! account's three authorization keys. The production implementation talks
//! JSON-RPC to a ledger node (`condenser_api.get_accounts`); tests swap in
//! an in-memory resolver through the `AccountResolver` trait.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::error::ChainError;
use crate::keys::PublicKey;

/// The three authorization key tiers of an account.
#[derive(Debug, Clone)]
pub struct AccountKeySet {
    pub owner: PublicKey,
    pub active: PublicKey,
    pub posting: PublicKey,
}

impl AccountKeySet {
    /// Set-membership test; tier order carries no meaning here.
    pub fn contains(&self, key: &PublicKey) -> bool {
        *key == self.owner || *key == self.active || *key == self.posting
    }
}

/// Resolves an account name to its authorization keys.
///
/// Keys are fetched fresh per request; no caching, so a key rotation on
/// chain takes effect immediately.
#[async_trait]
pub trait AccountResolver: Send + Sync {
    async fn resolve_account(&self, name: &str) -> Result<Option<AccountKeySet>, ChainError>;
}

/// JSON-RPC resolver backed by a ledger node.
pub struct JsonRpcResolver {
    client: reqwest::Client,
    endpoint: String,
    address_prefix: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Vec<RpcAccount>>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RpcAccount {
    owner: RpcAuthority,
    active: RpcAuthority,
    posting: RpcAuthority,
}

#[derive(Deserialize)]
struct RpcAuthority {
    key_auths: Vec<(String, serde_json::Value)>,
}

impl RpcAuthority {
    /// First key of the authority, the tier's primary key.
    fn primary_key(&self, prefix: &str) -> Result<PublicKey, ChainError> {
        let (text, _weight) = self.key_auths.first().ok_or_else(|| {
            ChainError::MalformedResponse("authority has no key entries".to_string())
        })?;
        PublicKey::from_chain_string(prefix, text)
            .map_err(|e| ChainError::MalformedResponse(e.to_string()))
    }
}

impl JsonRpcResolver {
    pub fn new(
        endpoint: impl Into<String>,
        address_prefix: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChainError::ResolverUnavailable(e.to_string()))?;

        Ok(JsonRpcResolver {
            client,
            endpoint: endpoint.into(),
            address_prefix: address_prefix.into(),
        })
    }
}

#[async_trait]
impl AccountResolver for JsonRpcResolver {
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn resolve_account(&self, name: &str) -> Result<Option<AccountKeySet>, ChainError> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "condenser_api.get_accounts",
            "params": [[name]],
            "id": 1,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChainError::ResolverTimeout
                } else {
                    ChainError::ResolverUnavailable(e.to_string())
                }
            })?;

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| ChainError::MalformedResponse(e.to_string()))?;

        if let Some(error) = body.error {
            return Err(ChainError::ResolverUnavailable(error.to_string()));
        }

        let accounts = body
            .result
            .ok_or_else(|| ChainError::MalformedResponse("missing result".to_string()))?;

        // The node returns one entry per matched name; anything else is a miss.
        let account = match accounts.as_slice() {
            [account] => account,
            _ => {
                tracing::debug!(account = %name, "account not found on chain");
                return Ok(None);
            }
        };

        Ok(Some(AccountKeySet {
            owner: account.owner.primary_key(&self.address_prefix)?,
            active: account.active.primary_key(&self.address_prefix)?,
            posting: account.posting.primary_key(&self.address_prefix)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::testing::public_key_for_seed;

    #[test]
    fn test_key_set_membership_any_tier() {
        let set = AccountKeySet {
            owner: public_key_for_seed(1),
            active: public_key_for_seed(2),
            posting: public_key_for_seed(3),
        };
        assert!(set.contains(&public_key_for_seed(1)));
        assert!(set.contains(&public_key_for_seed(2)));
        assert!(set.contains(&public_key_for_seed(3)));
        assert!(!set.contains(&public_key_for_seed(4)));
    }

    #[test]
    fn test_authority_primary_key_parses_chain_form() {
        let key = public_key_for_seed(5);
        let authority = RpcAuthority {
            key_auths: vec![(key.to_chain_string("BLT"), serde_json::json!(1))],
        };
        assert_eq!(authority.primary_key("BLT").unwrap(), key);
    }

    #[test]
    fn test_authority_without_keys_is_malformed() {
        let authority = RpcAuthority { key_auths: vec![] };
        assert!(matches!(
            authority.primary_key("BLT"),
            Err(ChainError::MalformedResponse(_))
        ));
    }
}
