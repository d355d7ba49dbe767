//! Runtime configuration for the token lifecycle manager.

use serde::{Deserialize, Serialize};

use crate::types::Environment;

/// Default expiry buffer applied before a token is considered unusable.
pub const DEFAULT_TOKEN_BUFFER_SECS: i64 = 300;

/// Authority endpoints and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtiConfig {
    /// API base URL for the sandbox environment.
    #[serde(default = "default_sandbox_url")]
    pub sandbox_url: String,

    /// API base URL for the production environment.
    #[serde(default = "default_production_url")]
    pub production_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Seconds before expiry at which a token is treated as expired.
    #[serde(default = "default_token_buffer")]
    pub token_buffer_secs: i64,
}

fn default_sandbox_url() -> String {
    "https://test-api.service.hmrc.gov.uk".to_string()
}

fn default_production_url() -> String {
    "https://api.service.hmrc.gov.uk".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_token_buffer() -> i64 {
    DEFAULT_TOKEN_BUFFER_SECS
}

impl Default for RtiConfig {
    fn default() -> Self {
        Self {
            sandbox_url: default_sandbox_url(),
            production_url: default_production_url(),
            timeout_secs: default_timeout(),
            token_buffer_secs: default_token_buffer(),
        }
    }
}

impl RtiConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `RTI_SANDBOX_URL` | Sandbox API base URL |
    /// | `RTI_PRODUCTION_URL` | Production API base URL |
    /// | `RTI_HTTP_TIMEOUT` | Request timeout in seconds |
    /// | `RTI_TOKEN_BUFFER` | Expiry buffer in seconds |
    pub fn from_env() -> Self {
        Self {
            sandbox_url: std::env::var("RTI_SANDBOX_URL")
                .unwrap_or_else(|_| default_sandbox_url()),
            production_url: std::env::var("RTI_PRODUCTION_URL")
                .unwrap_or_else(|_| default_production_url()),
            timeout_secs: std::env::var("RTI_HTTP_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout),
            token_buffer_secs: std::env::var("RTI_TOKEN_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_token_buffer),
        }
    }

    /// Base URL for an environment, without trailing slash.
    pub fn base_url(&self, environment: Environment) -> &str {
        match environment {
            Environment::Sandbox => self.sandbox_url.trim_end_matches('/'),
            Environment::Production => self.production_url.trim_end_matches('/'),
        }
    }

    /// Point both environments at the same base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.sandbox_url = url.clone();
        self.production_url = url;
        self
    }

    /// Set the sandbox base URL.
    pub fn with_sandbox_url(mut self, url: impl Into<String>) -> Self {
        self.sandbox_url = url.into();
        self
    }

    /// Set the production base URL.
    pub fn with_production_url(mut self, url: impl Into<String>) -> Self {
        self.production_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the expiry buffer.
    pub fn with_token_buffer_secs(mut self, secs: i64) -> Self {
        self.token_buffer_secs = secs;
        self
    }
}
