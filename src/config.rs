//! Agent endpoint configuration.
//!
//! Use the builder pattern to customize, or [`AgentConfig::from_env`] to read
//! the `DOCVERIFY_*` environment variables.
//!
//! # Example
//!
//! ```ignore
//! use docverify::config::AgentConfig;
//!
//! let config = AgentConfig::default()
//!     .with_base_url("https://agent.example.com")
//!     .with_api_key("secret")
//!     .with_request_timeout_secs(30);
//! ```

use std::collections::HashMap;
use std::time::Duration;

use tracing::warn;

use crate::error::{AgentError, AgentResult};

pub const ENV_AGENT_URL: &str = "DOCVERIFY_AGENT_URL";
pub const ENV_API_KEY: &str = "DOCVERIFY_API_KEY";
pub const ENV_AGENT_ID: &str = "DOCVERIFY_AGENT_ID";
pub const ENV_TIMEOUT_SECS: &str = "DOCVERIFY_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Where and how to reach the verification agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Scheme, host and optional port, without a trailing slash
    pub base_url: String,
    /// Sent as a bearer token when present
    pub api_key: Option<String>,
    /// Sent as `X-Agent-Id` when present
    pub agent_id: Option<String>,
    pub request_timeout_secs: u64,
    /// Path for buffered message calls
    pub message_path: String,
    /// Path for streaming message calls
    pub stream_path: String,
    pub health_path: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            agent_id: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            message_path: "/v1/messages".to_string(),
            stream_path: "/v1/messages/stream".to_string(),
            health_path: "/health".to_string(),
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the agent base URL. A trailing slash is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_agent_id(mut self, id: impl Into<String>) -> Self {
        self.agent_id = Some(id.into());
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_message_path(mut self, path: impl Into<String>) -> Self {
        self.message_path = path.into();
        self
    }

    pub fn with_stream_path(mut self, path: impl Into<String>) -> Self {
        self.stream_path = path.into();
        self
    }

    /// Create config from the `DOCVERIFY_*` environment variables.
    ///
    /// Unset or empty variables keep their defaults. An unparseable timeout
    /// is logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(url) = env_non_empty(ENV_AGENT_URL) {
            config = config.with_base_url(url);
        }
        if let Some(key) = env_non_empty(ENV_API_KEY) {
            config = config.with_api_key(key);
        }
        if let Some(id) = env_non_empty(ENV_AGENT_ID) {
            config = config.with_agent_id(id);
        }
        if let Some(raw) = env_non_empty(ENV_TIMEOUT_SECS) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config = config.with_request_timeout_secs(secs),
                _ => warn!(
                    value = %raw,
                    default = DEFAULT_TIMEOUT_SECS,
                    "ignoring invalid {}", ENV_TIMEOUT_SECS
                ),
            }
        }

        config
    }

    /// Reject settings no request could succeed with.
    pub fn validate(&self) -> AgentResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(AgentError::config(format!(
                "agent URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(AgentError::config("request timeout must be positive"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn message_url(&self) -> String {
        join_url(&self.base_url, &self.message_path)
    }

    pub fn stream_url(&self) -> String {
        join_url(&self.base_url, &self.stream_path)
    }

    pub fn health_url(&self) -> String {
        join_url(&self.base_url, &self.health_path)
    }

    /// Headers carried by every agent request.
    pub fn headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        if let Some(ref key) = self.api_key {
            headers.insert("Authorization".to_string(), format!("Bearer {}", key));
        }
        if let Some(ref id) = self.agent_id {
            headers.insert("X-Agent-Id".to_string(), id.clone());
        }
        headers
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn join_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
