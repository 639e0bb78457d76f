//! HTTP transport configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the reqwest transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout, in milliseconds.
    ///
    /// Bounds how long a hung device can hold the in-flight slot of a
    /// scheduler.
    pub timeout_ms: u64,
    /// `User-Agent` header sent with every status request.
    pub user_agent: String,
}

impl HttpConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: concat!("statuspoll/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
