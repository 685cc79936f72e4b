//! Gateway error types.

use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Gateway Error
// ============================================================================

/// Error type for API gateway operations.
///
/// `Network` and `Timeout` mean no response arrived; `Api` means the server
/// answered with a non-2xx status.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Transport failure (connect, reset, DNS).
    #[error("Network error: {0}")]
    Network(String),

    /// Request deadline elapsed.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-2xx response.
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// 2xx response whose body did not decode.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// Base URL or path could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Creates an API error.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Creates a 404 with a FastAPI-style body.
    pub fn not_found(detail: &str) -> Self {
        Self::api(404, serde_json::json!({ "detail": detail }).to_string())
    }

    /// Classifies a reqwest error. `timeout` is the deadline the client
    /// was built with.
    pub fn from_reqwest(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }

    /// Returns true if no response was received.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }

    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for a 404 response.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns true if repeating the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        self.is_network() || self.status().is_some_and(|s| s >= 500)
    }

    /// Human-readable reason. Uses the `detail` field of JSON error
    /// bodies when present.
    pub fn detail(&self) -> String {
        match self {
            Self::Api { status, body } => serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {status}")),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(GatewayError::Network("reset".into()).is_network());
        assert!(GatewayError::Timeout(Duration::from_secs(5)).is_network());
        assert!(!GatewayError::api(404, "").is_network());
        assert!(GatewayError::not_found("post not found").is_not_found());
    }

    #[test]
    fn test_retryable() {
        assert!(GatewayError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(GatewayError::api(503, "").is_retryable());
        assert!(!GatewayError::api(422, "").is_retryable());
        assert!(!GatewayError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn test_detail_from_json_body() {
        let err = GatewayError::api(400, r#"{"detail":"value must be 1, -1, or 0"}"#);
        assert_eq!(err.detail(), "value must be 1, -1, or 0");
        assert_eq!(GatewayError::api(502, "<html>").detail(), "HTTP 502");
    }
}
