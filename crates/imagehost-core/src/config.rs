//! Configuration module
//!
//! Environment-derived configuration for the imagehost service. Loaded
//! once at startup with `Config::from_env()` and validated with
//! `Config::validate()` so misconfiguration fails fast before the server
//! binds.

use std::env;
use std::time::Duration;

// Defaults carried over from the original deployment: a 69-point budget
// with a 23-point upload cost allows 3 images per hour.
const DEFAULT_PORT: u16 = 7070;
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;
const DEFAULT_RATE_LIMIT_POINTS: u32 = 69;
const DEFAULT_RATE_LIMIT_UPLOAD_COST: u32 = 23;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 3600;
const DEFAULT_RESOLVER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ADDRESS_PREFIX: &str = "BLT";

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    S3,
}

impl StorageBackend {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "local" => Some(StorageBackend::Local),
            "s3" => Some(StorageBackend::S3),
            _ => None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    // Chain / resolver
    pub jsonrpc_url: String,
    pub resolver_timeout: Duration,
    pub address_prefix: String,
    // Upload limits
    pub max_body_bytes: usize,
    pub max_image_bytes: usize,
    // Rate limiting
    pub rate_limit_points: u32,
    pub rate_limit_upload_cost: u32,
    pub rate_limit_window: Duration,
    // Storage
    pub storage_backend: StorageBackend,
    pub store_timeout: Duration,
    pub public_url_base: String,
    pub local_storage_path: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, anyhow::Error> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{} is not a valid value for {}", raw, key)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let jsonrpc_url = env::var("JSONRPC_URL")
            .map_err(|_| anyhow::anyhow!("JSONRPC_URL must be set"))?;
        let public_url_base = env::var("PUBLIC_URL_BASE")
            .map_err(|_| anyhow::anyhow!("PUBLIC_URL_BASE must be set"))?;

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => StorageBackend::parse(&raw)
                .ok_or_else(|| anyhow::anyhow!("unknown STORAGE_BACKEND: {}", raw))?,
            Err(_) => StorageBackend::Local,
        };

        Ok(Config {
            server_port: env_parse("PORT", DEFAULT_PORT)?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            jsonrpc_url,
            resolver_timeout: Duration::from_secs(env_parse(
                "RESOLVER_TIMEOUT_SECS",
                DEFAULT_RESOLVER_TIMEOUT_SECS,
            )?),
            address_prefix: env::var("ADDRESS_PREFIX")
                .unwrap_or_else(|_| DEFAULT_ADDRESS_PREFIX.to_string()),
            max_body_bytes: env_parse("MAX_JSON_BODY_IN_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            max_image_bytes: env_parse("MAX_IMAGE_SIZE_IN_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            rate_limit_points: env_parse("RATE_LIMIT_POINTS", DEFAULT_RATE_LIMIT_POINTS)?,
            rate_limit_upload_cost: env_parse(
                "RATE_LIMIT_UPLOAD_COST",
                DEFAULT_RATE_LIMIT_UPLOAD_COST,
            )?,
            rate_limit_window: Duration::from_secs(env_parse(
                "RATE_LIMIT_WINDOW_SECS",
                DEFAULT_RATE_LIMIT_WINDOW_SECS,
            )?),
            storage_backend,
            store_timeout: Duration::from_secs(env_parse(
                "STORE_TIMEOUT_SECS",
                DEFAULT_STORE_TIMEOUT_SECS,
            )?),
            public_url_base,
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_image_bytes == 0 || self.max_body_bytes == 0 {
            anyhow::bail!("size limits must be greater than zero");
        }
        if self.max_image_bytes > self.max_body_bytes {
            anyhow::bail!(
                "MAX_IMAGE_SIZE_IN_BYTES ({}) cannot exceed MAX_JSON_BODY_IN_BYTES ({})",
                self.max_image_bytes,
                self.max_body_bytes
            );
        }
        if self.rate_limit_upload_cost == 0 {
            anyhow::bail!("RATE_LIMIT_UPLOAD_COST must be greater than zero");
        }
        if self.rate_limit_points < self.rate_limit_upload_cost {
            anyhow::bail!(
                "RATE_LIMIT_POINTS ({}) smaller than one upload cost ({})",
                self.rate_limit_points,
                self.rate_limit_upload_cost
            );
        }
        if self.rate_limit_window.is_zero() {
            anyhow::bail!("RATE_LIMIT_WINDOW_SECS must be greater than zero");
        }
        match self.storage_backend {
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    anyhow::bail!("LOCAL_STORAGE_PATH not configured");
                }
            }
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    anyhow::bail!("S3_BUCKET not configured");
                }
                if self.s3_region.is_none() && self.s3_endpoint.is_none() {
                    anyhow::bail!("S3_REGION or S3_ENDPOINT not configured");
                }
            }
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Budget of uploads a single identity gets per window.
    pub fn uploads_per_window(&self) -> u32 {
        self.rate_limit_points / self.rate_limit_upload_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server_port: 7070,
            environment: "test".to_string(),
            jsonrpc_url: "https://rpc.example.net".to_string(),
            resolver_timeout: Duration::from_secs(10),
            address_prefix: "BLT".to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            rate_limit_points: DEFAULT_RATE_LIMIT_POINTS,
            rate_limit_upload_cost: DEFAULT_RATE_LIMIT_UPLOAD_COST,
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            storage_backend: StorageBackend::Local,
            store_timeout: Duration::from_secs(30),
            public_url_base: "https://images.example.net".to_string(),
            local_storage_path: Some("/tmp/imagehost".to_string()),
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
        }
    }

    #[test]
    fn test_default_budget_allows_three_uploads() {
        assert_eq!(base_config().uploads_per_window(), 3);
    }

    #[test]
    fn test_validate_accepts_local_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_local_path() {
        let mut config = base_config();
        config.local_storage_path = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_s3_without_bucket() {
        let mut config = base_config();
        config.storage_backend = StorageBackend::S3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_budget_below_cost() {
        let mut config = base_config();
        config.rate_limit_points = 10;
        config.rate_limit_upload_cost = 23;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_image_cap_above_body_cap() {
        let mut config = base_config();
        config.max_image_bytes = config.max_body_bytes + 1;
        assert!(config.validate().is_err());
    }
}
