//! Error types for the admin API client
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

/// Maximum length for error response bodies kept in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

// == API Error Enum ==
/// Errors surfaced to callers of the API client.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, bad body)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// 401 from the remote API
    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    /// 403 from the remote API
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// 404 from the remote API
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// 429 from the remote API
    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    /// 5xx from the remote API
    #[error("Server error: {0}")]
    Server(String),

    /// Unexpected status or undecodable payload
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request could not be built (e.g. body serialization failed)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    // == From Status ==
    /// Maps a non-success HTTP status and its body to an error variant.
    pub fn from_status(status: u16, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::Server(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }
}

// == Storage Error Enum ==
/// Failures of the durable mirror. These never escape the cache store;
/// they are logged and degrade to a miss or a no-op.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// == Result Type Alias ==
/// Convenience Result type for the API client.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(ApiError::from_status(401, ""), ApiError::Unauthorized));
        assert!(matches!(ApiError::from_status(403, "no"), ApiError::AccessDenied(_)));
        assert!(matches!(ApiError::from_status(404, "gone"), ApiError::NotFound(_)));
        assert!(matches!(ApiError::from_status(429, ""), ApiError::RateLimited));
        assert!(matches!(ApiError::from_status(503, "down"), ApiError::Server(_)));
        assert!(matches!(
            ApiError::from_status(418, "teapot"),
            ApiError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY_LENGTH + 100);
        match ApiError::from_status(500, &body) {
            ApiError::Server(msg) => {
                assert!(msg.contains("truncated"));
                assert!(msg.len() < body.len());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let body = "é".repeat(MAX_ERROR_BODY_LENGTH);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated"));
    }
}
