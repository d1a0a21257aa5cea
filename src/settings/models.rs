use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://pricing.us-east-1.amazonaws.com";
pub const DEFAULT_INDEX_PATH: &str = "/offers/v1.0/aws/index.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = "cloud-pricing-finder-rust/1.0";

/// Endpoint and transport configuration. Missing JSON fields fall back to the
/// public AWS pricing endpoint defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub(crate) base_url: String,
    pub(crate) index_path: String,
    pub(crate) timeout_secs: u64,
    pub(crate) user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            index_path: DEFAULT_INDEX_PATH.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Settings {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn index_path(&self) -> &str {
        &self.index_path
    }

    /// Per-request timeout applied to every retrieval.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}
