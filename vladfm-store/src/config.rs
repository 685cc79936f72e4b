//! Client configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use vladfm_core::FeedSort;
use vladfm_fetch::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, GatewaySettings, RetryPolicy};

use crate::error::StoreError;
use crate::persistence::{default_config_path, load_json, save_json};

/// Client configuration, stored as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL including the `/api` prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request deadline in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Attempts for idempotent reads. 1 means no retry.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Sort mode the feed opens with.
    #[serde(default)]
    pub default_sort: FeedSort,
    /// Name used for comments when none is given.
    #[serde(default)]
    pub author_name: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_retry_attempts() -> u32 {
    1
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            default_sort: FeedSort::default(),
            author_name: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path.
    pub async fn load() -> Result<Self, StoreError> {
        Self::load_from(&default_config_path()).await
    }

    /// Loads configuration from a specific path. A missing file yields the
    /// defaults.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let config: Self = load_json(path).await?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to the default path.
    pub async fn save(&self) -> Result<(), StoreError> {
        self.save_to(&default_config_path()).await
    }

    /// Saves configuration to a specific path.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        self.validate()?;
        save_json(path, self).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks values that would make the client unusable.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.base_url.trim().is_empty() {
            return Err(StoreError::Config("base_url is empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(StoreError::Config("timeout_secs must be at least 1".into()));
        }
        if self.retry_attempts == 0 {
            return Err(StoreError::Config("retry_attempts must be at least 1".into()));
        }
        Ok(())
    }

    /// Request deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Settings for building an HTTP gateway.
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings::new(self.base_url.trim()).with_timeout(self.timeout())
    }

    /// Retry policy for idempotent reads.
    pub fn retry_policy(&self) -> RetryPolicy {
        if self.retry_attempts <= 1 {
            RetryPolicy::no_retry()
        } else {
            RetryPolicy::new(self.retry_attempts)
        }
    }

    /// Comment author, falling back to `anonymous`.
    pub fn author_or_anonymous(&self) -> &str {
        self.author_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(crate::post_store::ANONYMOUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api");
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.retry_policy().max_attempts, 1);
        assert_eq!(config.author_or_anonymous(), "anonymous");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "https://vlad.fm/api", "default_sort": "top"}"#).unwrap();
        assert_eq!(config.base_url, "https://vlad.fm/api");
        assert_eq!(config.default_sort, FeedSort::Top);
        assert_eq!(config.timeout_secs, 15);
    }

    #[tokio::test]
    async fn test_missing_file_is_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&temp_dir.path().join("config.json")).await.unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[tokio::test]
    async fn test_invalid_values_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        tokio::fs::write(&path, r#"{"timeout_secs": 0}"#).await.unwrap();

        let err = ClientConfig::load_from(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_retry_policy_from_attempts() {
        let config = ClientConfig {
            retry_attempts: 3,
            ..Default::default()
        };
        assert_eq!(config.retry_policy().max_attempts, 3);
    }
}
