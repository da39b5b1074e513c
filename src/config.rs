//! Configuration Module
//!
//! Handles loading and managing configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Default public Solana RPC endpoint.
pub const DEFAULT_RPC_ENDPOINT: &str = "https://api.mainnet-beta.solana.com";

/// Sidecar configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Soft ceiling on the estimated cache size in bytes
    pub max_size_bytes: usize,
    /// Default TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
    /// Run-length encode string values
    pub compression_enabled: bool,
    /// Pending state updates that force an immediate flush
    pub sync_batch_size: usize,
    /// State flush ticker interval in milliseconds
    pub sync_flush_interval_ms: u64,
    /// Maximum listeners per event
    pub max_listeners: usize,
    /// Buffered write operations that force a commit
    pub batch_threshold: usize,
    /// Transaction relay poll interval in milliseconds
    pub tx_poll_interval_ms: u64,
    /// Submission attempts before a transaction is dropped
    pub tx_max_retries: u32,
    /// JSON-RPC endpoint for transaction relay
    pub rpc_endpoint: String,
    /// Path of the persisted preferences file
    pub prefs_path: String,
    /// HTTP server port
    pub server_port: u16,
    /// Expired-entry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_SIZE_BYTES` - Cache size ceiling (default: 5 MiB)
    /// - `DEFAULT_TTL_MS` - Default TTL (default: 300000)
    /// - `COMPRESSION_ENABLED` - RLE string values (default: false)
    /// - `SYNC_BATCH_SIZE` - Eager flush threshold (default: 50)
    /// - `SYNC_FLUSH_INTERVAL_MS` - Flush tick (default: 1000)
    /// - `MAX_LISTENERS` - Listener cap per event (default: 10)
    /// - `BATCH_THRESHOLD` - Write batch size (default: 500)
    /// - `TX_POLL_INTERVAL_MS` - Relay poll tick (default: 1000)
    /// - `TX_MAX_RETRIES` - Relay attempts (default: 3)
    /// - `RPC_ENDPOINT` - JSON-RPC URL
    /// - `PREFS_PATH` - Preferences file (default: `.nft_sync_prefs.json`)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size_bytes: env_or("MAX_SIZE_BYTES", defaults.max_size_bytes),
            default_ttl_ms: env_or("DEFAULT_TTL_MS", defaults.default_ttl_ms),
            compression_enabled: env_or("COMPRESSION_ENABLED", defaults.compression_enabled),
            sync_batch_size: env_or("SYNC_BATCH_SIZE", defaults.sync_batch_size),
            sync_flush_interval_ms: env_or(
                "SYNC_FLUSH_INTERVAL_MS",
                defaults.sync_flush_interval_ms,
            ),
            max_listeners: env_or("MAX_LISTENERS", defaults.max_listeners),
            batch_threshold: env_or("BATCH_THRESHOLD", defaults.batch_threshold),
            tx_poll_interval_ms: env_or("TX_POLL_INTERVAL_MS", defaults.tx_poll_interval_ms),
            tx_max_retries: env_or("TX_MAX_RETRIES", defaults.tx_max_retries),
            rpc_endpoint: env::var("RPC_ENDPOINT").unwrap_or(defaults.rpc_endpoint),
            prefs_path: env::var("PREFS_PATH").unwrap_or(defaults.prefs_path),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size_bytes: 5 * 1024 * 1024,
            default_ttl_ms: 300_000,
            compression_enabled: false,
            sync_batch_size: 50,
            sync_flush_interval_ms: 1000,
            max_listeners: 10,
            batch_threshold: 500,
            tx_poll_interval_ms: 1000,
            tx_max_retries: 3,
            rpc_endpoint: DEFAULT_RPC_ENDPOINT.to_string(),
            prefs_path: ".nft_sync_prefs.json".to_string(),
            server_port: 3000,
            cleanup_interval: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.default_ttl_ms, 300_000);
        assert!(!config.compression_enabled);
        assert_eq!(config.sync_batch_size, 50);
        assert_eq!(config.sync_flush_interval_ms, 1000);
        assert_eq!(config.max_listeners, 10);
        assert_eq!(config.tx_max_retries, 3);
        assert_eq!(config.rpc_endpoint, DEFAULT_RPC_ENDPOINT);
    }

    #[test]
    fn test_config_from_env_defaults() {
        env::remove_var("MAX_SIZE_BYTES");
        env::remove_var("DEFAULT_TTL_MS");
        env::remove_var("SERVER_PORT");
        env::remove_var("CLEANUP_INTERVAL");

        let config = Config::from_env();
        assert_eq!(config.max_size_bytes, 5 * 1024 * 1024);
        assert_eq!(config.default_ttl_ms, 300_000);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
    }

    #[test]
    fn test_env_or_ignores_unparseable_value() {
        env::set_var("NFT_SYNC_TEST_BAD_NUMBER", "not-a-number");
        assert_eq!(env_or("NFT_SYNC_TEST_BAD_NUMBER", 7u32), 7);
        env::remove_var("NFT_SYNC_TEST_BAD_NUMBER");
    }
}
