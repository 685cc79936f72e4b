//! Store error types.

use thiserror::Error;
use vladfm_core::CoreError;
use vladfm_fetch::{GatewayError, Retryable};

/// Errors that can occur in the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Input rejected before reaching the backend.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Identity storage backend failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Gateway(e) => e.is_retryable(),
            StoreError::Io(_) | StoreError::Storage(_) => true,
            _ => false,
        }
    }

    /// The gateway error, if this came from the backend.
    pub fn as_gateway(&self) -> Option<&GatewayError> {
        match self {
            StoreError::Gateway(e) => Some(e),
            _ => None,
        }
    }
}

impl Retryable for StoreError {
    fn gateway_error(&self) -> Option<&GatewayError> {
        self.as_gateway()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use vladfm_fetch::RetryPolicy;

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::from(GatewayError::Network("reset".into())).is_transient());
        assert!(StoreError::from(GatewayError::api(503, "")).is_transient());
        assert!(!StoreError::from(GatewayError::api(404, "")).is_transient());
        assert!(!StoreError::from(CoreError::InvalidPage(0)).is_transient());
        assert!(!StoreError::Config("bad".into()).is_transient());
    }

    #[test]
    fn test_gateway_errors_surface_unchanged() {
        let err = StoreError::from(GatewayError::api(404, r#"{"detail":"Post not found"}"#));
        assert_eq!(err.to_string(), GatewayError::api(404, r#"{"detail":"Post not found"}"#).to_string());
        assert!(err.as_gateway().is_some_and(GatewayError::is_not_found));
    }

    #[tokio::test]
    async fn test_retry_policy_retries_gateway_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3).with_base_delay(Duration::ZERO);

        let result = policy
            .run(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(StoreError::from(GatewayError::Network("reset".into())))
                } else {
                    Ok("ok")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_policy_skips_invalid_input() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3).with_base_delay(Duration::ZERO);

        let result: Result<(), _> = policy
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::from(CoreError::InvalidPage(0)))
            })
            .await;

        assert!(matches!(result, Err(StoreError::Core(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
