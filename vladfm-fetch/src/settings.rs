//! Gateway settings.

use std::time::Duration;

/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Default request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// User agent string for vladFM.
pub const USER_AGENT: &str = concat!("vladfm/", env!("CARGO_PKG_VERSION"));

/// Settings for the HTTP gateway.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Base URL including the `/api` prefix.
    pub base_url: String,
    /// Deadline for each request.
    pub timeout: Duration,
    /// User agent header.
    pub user_agent: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl GatewaySettings {
    /// Creates settings for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Sets a custom timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets a custom user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
