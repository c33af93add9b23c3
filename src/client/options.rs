//! Typed request options, including the cache directives.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::{ApiError, Result};

// == Method ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

// == Request Options ==
/// Per-request settings.
///
/// Defaults: `GET`, no body, `use_cache = true`, `force_refresh = false`,
/// `cache_ttl = None` (use the TTL policy), `cache_non_get = false`.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    /// Serialized request body
    pub body: Option<String>,
    /// Consult and fill the cache for this request
    pub use_cache: bool,
    /// Skip the cache lookup but still store the fresh response
    pub force_refresh: bool,
    /// Overrides the TTL policy for this response
    pub cache_ttl: Option<Duration>,
    /// Allow caching of non-GET requests
    pub cache_non_get: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::Get,
            headers: Vec::new(),
            body: None,
            use_cache: true,
            force_refresh: false,
            cache_ttl: None,
            cache_non_get: false,
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serializes `body` as the JSON request body.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let encoded = serde_json::to_string(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body: {e}")))?;
        self.body = Some(encoded);
        Ok(self)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub fn with_force_refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn with_cache_non_get(mut self) -> Self {
        self.cache_non_get = true;
        self
    }

    /// `use_cache && (method == GET || cache_non_get)`
    pub fn is_cacheable(&self) -> bool {
        self.use_cache && (self.method == Method::Get || self.cache_non_get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let options = RequestOptions::default();
        assert_eq!(options.method, Method::Get);
        assert!(options.use_cache);
        assert!(!options.force_refresh);
        assert!(!options.cache_non_get);
        assert!(options.cache_ttl.is_none());
        assert!(options.is_cacheable());
    }

    #[test]
    fn test_cacheability() {
        assert!(!RequestOptions::new(Method::Post).is_cacheable());
        assert!(RequestOptions::new(Method::Post)
            .with_cache_non_get()
            .is_cacheable());
        assert!(!RequestOptions::get().without_cache().is_cacheable());
        assert!(!RequestOptions::new(Method::Delete)
            .with_cache_non_get()
            .without_cache()
            .is_cacheable());
    }

    #[test]
    fn test_with_json_body() {
        let options = RequestOptions::new(Method::Patch)
            .with_json(&json!({"status": "active"}))
            .unwrap();
        assert_eq!(options.body.as_deref(), Some(r#"{"status":"active"}"#));
    }

    #[test]
    fn test_method_strings() {
        assert_eq!(Method::Patch.as_str(), "PATCH");
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert_eq!(reqwest::Method::from(Method::Put), reqwest::Method::PUT);
    }
}
