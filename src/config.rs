//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL in seconds applied to cached entries, 0 = never expire
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Token expected in the `x-admin-token` header, admin routes are closed when unset
    pub admin_token: Option<String>,
    /// Optional JSON seed file for the in-memory catalog
    pub catalog_seed_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Entry TTL in seconds, 0 disables expiry (default: 0)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `ADMIN_TOKEN` - Admin token (default: unset)
    /// - `CATALOG_SEED_PATH` - Catalog seed file (default: built-in seed)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            admin_token: non_empty_var("ADMIN_TOKEN"),
            catalog_seed_path: non_empty_var("CATALOG_SEED_PATH").map(PathBuf::from),
        }
    }

    /// Returns the configured TTL, or None when entries never expire.
    pub fn ttl(&self) -> Option<u64> {
        (self.default_ttl > 0).then_some(self.default_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            default_ttl: 0,
            server_port: 3000,
            cleanup_interval: 60,
            admin_token: None,
            catalog_seed_path: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
