//! Configuration Module
//!
//! Handles loading client and cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{EvictionPolicy, DEFAULT_MAX_ENTRIES, DEFAULT_STORAGE_PREFIX};

/// Directory name under the user cache directory
const APP_NAME: &str = "admin-client";

/// Durable storage file name
const STORAGE_FILE: &str = "storage.json";

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL every endpoint is appended to
    pub base_url: String,
    /// Bearer token for authenticated requests
    pub api_token: Option<String>,
    /// Maximum number of in-memory cache entries
    pub max_entries: usize,
    /// TTL for endpoints no policy rule matches
    pub default_ttl: Duration,
    /// Interval between expiry sweeps
    pub cleanup_interval: Duration,
    /// Durable mirror location
    pub storage_path: PathBuf,
    /// Namespace of cache keys inside the durable mirror
    pub storage_prefix: String,
    /// Per-request timeout handed to the HTTP transport
    pub request_timeout: Duration,
    pub eviction_policy: EvictionPolicy,
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn default_storage_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join(APP_NAME)
        .join(STORAGE_FILE)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ADMIN_API_BASE_URL` - API base URL (default: http://localhost:5000/api)
    /// - `ADMIN_API_TOKEN` - Bearer token (default: none)
    /// - `CACHE_MAX_ENTRIES` - In-memory capacity (default: 100)
    /// - `CACHE_DEFAULT_TTL_MS` - Fallback TTL in milliseconds (default: 300000)
    /// - `CACHE_CLEANUP_INTERVAL_SECS` - Sweep frequency in seconds (default: 300)
    /// - `CACHE_STORAGE_PATH` - Durable mirror file (default: user cache dir)
    /// - `CACHE_STORAGE_PREFIX` - Durable key namespace (default: muslifie_cache_)
    /// - `REQUEST_TIMEOUT_SECS` - HTTP timeout in seconds (default: 30)
    /// - `CACHE_EVICTION_POLICY` - `fifo` or `lru` (default: fifo)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: env::var("ADMIN_API_BASE_URL").unwrap_or(defaults.base_url),
            api_token: env::var("ADMIN_API_TOKEN").ok().filter(|t| !t.is_empty()),
            max_entries: env_parse("CACHE_MAX_ENTRIES").unwrap_or(defaults.max_entries),
            default_ttl: env_parse("CACHE_DEFAULT_TTL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.default_ttl),
            cleanup_interval: env_parse("CACHE_CLEANUP_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            storage_path: env::var("CACHE_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            storage_prefix: env::var("CACHE_STORAGE_PREFIX").unwrap_or(defaults.storage_prefix),
            request_timeout: env_parse("REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            eviction_policy: env_parse("CACHE_EVICTION_POLICY")
                .unwrap_or(defaults.eviction_policy),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            api_token: None,
            max_entries: DEFAULT_MAX_ENTRIES,
            default_ttl: Duration::from_secs(5 * 60),
            cleanup_interval: Duration::from_secs(5 * 60),
            storage_path: default_storage_path(),
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            request_timeout: Duration::from_secs(30),
            eviction_policy: EvictionPolicy::Fifo,
        }
    }
}
