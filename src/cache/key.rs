//! Cache key derivation and TTL policy.

use std::fmt;
use std::time::Duration;

use crate::client::RequestOptions;

// == Cache Key ==
/// Stable identity of a request: `METHOD:endpoint:body:query`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

// == Derive Key ==
/// Builds the cache key for a request. Pure: no I/O, same inputs give the
/// same key.
pub fn derive_key(endpoint: &str, options: &RequestOptions) -> CacheKey {
    let body = options.body.as_deref().unwrap_or("");
    let query = endpoint
        .split_once('?')
        .map(|(_, query)| query)
        .unwrap_or("");

    CacheKey(format!(
        "{}:{}:{}:{}",
        options.method.as_str(),
        endpoint,
        body,
        query
    ))
}

// == TTL Policy ==
/// Default freshness for paths no rule matches.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Ordered substring rules mapping endpoint families to a TTL.
///
/// Rules are checked in registration order and the first pattern contained in
/// the endpoint wins.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    rules: Vec<(String, Duration)>,
    default_ttl: Duration,
}

impl TtlPolicy {
    /// An empty policy: every endpoint gets `default_ttl`.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            rules: Vec::new(),
            default_ttl,
        }
    }

    /// The dashboard's policy: volatile money and moderation queues refresh
    /// quickly, catalogue-style data lives longer.
    pub fn dashboard(default_ttl: Duration) -> Self {
        Self::new(default_ttl)
            .with_rule("/admin/dashboard", Duration::from_secs(2 * 60))
            .with_rule("/admin/analytics", Duration::from_secs(2 * 60))
            .with_rule("/admin/earnings", Duration::from_secs(2 * 60))
            .with_rule("/admin/withdrawals", Duration::from_secs(60))
            .with_rule("/admin/verifications", Duration::from_secs(60))
            .with_rule("/admin/bookings", Duration::from_secs(60))
            .with_rule("/admin/users", Duration::from_secs(5 * 60))
            .with_rule("/admin/tours", Duration::from_secs(10 * 60))
            .with_rule("/auth/me", Duration::from_secs(10 * 60))
            .with_rule("/admin/settings", Duration::from_secs(30 * 60))
    }

    pub fn with_rule(mut self, pattern: impl Into<String>, ttl: Duration) -> Self {
        self.rules.push((pattern.into(), ttl));
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Resolve ==
    pub fn resolve(&self, endpoint: &str) -> Duration {
        self.rules
            .iter()
            .find(|(pattern, _)| endpoint.contains(pattern.as_str()))
            .map(|(_, ttl)| *ttl)
            .unwrap_or(self.default_ttl)
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::dashboard(DEFAULT_TTL)
    }
}
