//! Configuration Module
//!
//! Handles loading and managing cache and server configuration from
//! environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Tuning for a single [`TokenCache`](crate::TokenCache) instance.
///
/// Immutable for the lifetime of the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Idle-eviction window
    pub ttl: Duration,
    /// Grace window passed to every validity check
    pub leeway: Duration,
    /// Period of the background cleanup pass
    pub sweep_interval: Duration,
    /// Soft capacity; exceeding it triggers a load-adaptive cleanup
    pub max_entries: usize,
    /// How long a caller waits for the worker to acknowledge an operation
    pub dispatch_timeout: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            leeway: Duration::ZERO,
            sweep_interval: Duration::from_secs(60),
            max_entries: 1000,
            dispatch_timeout: Duration::from_secs(5),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Token cache settings
    pub cache: CacheConfig,
    /// HTTP server port
    pub server_port: u16,
    /// HS256 secret used by the verify endpoint, if any
    pub jwt_secret: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `TOKEN_TTL` - Idle-eviction window in seconds (default: 300)
    /// - `TOKEN_LEEWAY` - Validity grace window in seconds (default: 0)
    /// - `SWEEP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `MAX_ENTRIES` - Soft cache capacity (default: 1000)
    /// - `DISPATCH_TIMEOUT_MS` - Worker acknowledgement bound in milliseconds (default: 5000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `JWT_SECRET` - HS256 verification secret (default: unset)
    pub fn from_env() -> Self {
        let defaults = CacheConfig::default();

        Self {
            cache: CacheConfig {
                ttl: env_parse("TOKEN_TTL")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.ttl),
                leeway: env_parse("TOKEN_LEEWAY")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.leeway),
                sweep_interval: env_parse("SWEEP_INTERVAL")
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.sweep_interval),
                max_entries: env_parse("MAX_ENTRIES").unwrap_or(defaults.max_entries),
                dispatch_timeout: env_parse("DISPATCH_TIMEOUT_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.dispatch_timeout),
            },
            server_port: env_parse("SERVER_PORT").unwrap_or(3000),
            jwt_secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            server_port: 3000,
            jwt_secret: None,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
