//! Client configuration from environment variables

use std::env;

use crate::error::SocialError;
use crate::ledger::is_valid_address;

/// Hard cap on post/reply body length, enforced before any network work.
pub const MAX_CONTENT_CHARS: usize = 280;

/// Symbol stamped into every minted record's metadata.
pub const METADATA_SYMBOL: &str = "SOCIAL";

/// Avatar used when a profile is created without an image.
pub const DEFAULT_AVATAR_URL: &str = "https://arweave.net/placeholder-default-avatar";

/// Configuration for the content client
///
/// Loaded from environment variables with sensible defaults; only the
/// collection address is mandatory.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Creator address grouping all records of this application
    pub collection_address: String,

    /// Ledger RPC endpoint for collection reads
    pub rpc_url: String,

    /// Pinning gateway for image uploads (None disables uploads)
    pub upload_url: Option<String>,

    /// Maximum records requested per collection scan
    pub scan_limit: usize,

    /// Wall-clock budget for one scan before the caller gets an empty result
    pub scan_timeout_ms: u64,

    /// Minimum gap between queued RPC dispatches
    pub request_gap_ms: u64,

    /// Dispatch pause after a rate-limit response
    pub rate_limit_cooldown_ms: u64,

    /// Freshness window for bulk record-list cache entries
    pub bulk_cache_ttl_secs: i64,

    /// Freshness window for profile point-lookup cache entries
    pub profile_cache_ttl_secs: i64,
}

impl ClientConfig {
    /// Build a config with defaults for everything but the collection.
    ///
    /// Fails fast when the collection address is not a valid base58
    /// public key, so misconfiguration never reaches the scan path.
    pub fn new(collection_address: &str) -> Result<Self, SocialError> {
        if collection_address.is_empty() {
            return Err(SocialError::NotConfigured(
                "collection address is empty".to_string(),
            ));
        }
        if !is_valid_address(collection_address) {
            return Err(SocialError::NotConfigured(format!(
                "collection address is not a valid public key: {}",
                collection_address
            )));
        }

        Ok(Self {
            collection_address: collection_address.to_string(),
            rpc_url: "https://api.devnet.solana.com".to_string(),
            upload_url: None,
            scan_limit: 50,
            scan_timeout_ms: 12_000,
            request_gap_ms: 50,
            rate_limit_cooldown_ms: 2_000,
            bulk_cache_ttl_secs: 60,
            profile_cache_ttl_secs: 300,
        })
    }

    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `SOCIAL_COLLECTION_ADDRESS` (required)
    /// - `SOCIAL_RPC_URL` (default: https://api.devnet.solana.com)
    /// - `SOCIAL_UPLOAD_URL` (default: unset, uploads disabled)
    /// - `SOCIAL_SCAN_LIMIT` (default: 50)
    /// - `SOCIAL_SCAN_TIMEOUT_MS` (default: 12000)
    /// - `SOCIAL_REQUEST_GAP_MS` (default: 50)
    /// - `SOCIAL_RATE_COOLDOWN_MS` (default: 2000)
    /// - `SOCIAL_BULK_TTL_SECS` (default: 60)
    /// - `SOCIAL_PROFILE_TTL_SECS` (default: 300)
    pub fn from_env() -> Result<Self, SocialError> {
        let collection = env::var("SOCIAL_COLLECTION_ADDRESS").map_err(|_| {
            SocialError::NotConfigured("SOCIAL_COLLECTION_ADDRESS is not set".to_string())
        })?;

        let mut config = Self::new(&collection)?;

        if let Ok(url) = env::var("SOCIAL_RPC_URL") {
            config.rpc_url = url;
        }
        config.upload_url = env::var("SOCIAL_UPLOAD_URL").ok();
        config.scan_limit = env_or("SOCIAL_SCAN_LIMIT", config.scan_limit);
        config.scan_timeout_ms = env_or("SOCIAL_SCAN_TIMEOUT_MS", config.scan_timeout_ms);
        config.request_gap_ms = env_or("SOCIAL_REQUEST_GAP_MS", config.request_gap_ms);
        config.rate_limit_cooldown_ms =
            env_or("SOCIAL_RATE_COOLDOWN_MS", config.rate_limit_cooldown_ms);
        config.bulk_cache_ttl_secs = env_or("SOCIAL_BULK_TTL_SECS", config.bulk_cache_ttl_secs);
        config.profile_cache_ttl_secs =
            env_or("SOCIAL_PROFILE_TTL_SECS", config.profile_cache_ttl_secs);

        Ok(config)
    }
}

fn env_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Wrapped-SOL mint, a well-formed base58 public key.
    const COLLECTION: &str = "So11111111111111111111111111111111111111112";

    #[test]
    fn test_default_config() {
        // Test: defaults when only the collection is supplied
        let config = ClientConfig::new(COLLECTION).unwrap();

        assert_eq!(config.collection_address, COLLECTION);
        assert_eq!(config.rpc_url, "https://api.devnet.solana.com");
        assert_eq!(config.upload_url, None);
        assert_eq!(config.scan_limit, 50);
        assert_eq!(config.scan_timeout_ms, 12_000);
        assert_eq!(config.request_gap_ms, 50);
        assert_eq!(config.rate_limit_cooldown_ms, 2_000);
        assert_eq!(config.bulk_cache_ttl_secs, 60);
        assert_eq!(config.profile_cache_ttl_secs, 300);
    }

    #[test]
    fn test_invalid_collection_rejected() {
        // Test: construction fails fast instead of probing at scan time
        assert!(matches!(
            ClientConfig::new(""),
            Err(SocialError::NotConfigured(_))
        ));
        assert!(matches!(
            ClientConfig::new("not-a-base58-key!!"),
            Err(SocialError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        // Test: env vars override defaults; kept in one test to avoid
        // racing other tests over process-wide env state
        env::set_var("SOCIAL_COLLECTION_ADDRESS", COLLECTION);
        env::set_var("SOCIAL_RPC_URL", "http://localhost:8899");
        env::set_var("SOCIAL_SCAN_LIMIT", "25");
        env::set_var("SOCIAL_SCAN_TIMEOUT_MS", "5000");

        let config = ClientConfig::from_env().unwrap();

        assert_eq!(config.rpc_url, "http://localhost:8899");
        assert_eq!(config.scan_limit, 25);
        assert_eq!(config.scan_timeout_ms, 5_000);
        // Untouched vars keep their defaults
        assert_eq!(config.bulk_cache_ttl_secs, 60);

        env::remove_var("SOCIAL_COLLECTION_ADDRESS");
        env::remove_var("SOCIAL_RPC_URL");
        env::remove_var("SOCIAL_SCAN_LIMIT");
        env::remove_var("SOCIAL_SCAN_TIMEOUT_MS");
    }
}
