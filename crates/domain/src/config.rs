//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_API_BASE_URL, DEFAULT_TOKEN_URL};
use crate::errors::{Result, TokenWardenError};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

/// OAuth application credentials and endpoints
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Token lifecycle tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Treat persisted tokens as expired this many seconds early.
    #[serde(default)]
    pub refresh_skew_secs: i64,
    #[serde(default = "default_operation_timeout_secs")]
    pub operation_timeout_secs: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub ephemeral_sweep_interval_secs: u64,
}

impl Config {
    /// Reject configurations that cannot possibly work.
    ///
    /// # Errors
    /// Returns `TokenWardenError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            return Err(TokenWardenError::Config("database.path must not be empty".into()));
        }
        if self.database.pool_size == 0 {
            return Err(TokenWardenError::Config("database.pool_size must be at least 1".into()));
        }
        if self.oauth.client_id.trim().is_empty() {
            return Err(TokenWardenError::Config("oauth.client_id must not be empty".into()));
        }
        if self.oauth.client_secret.is_empty() {
            return Err(TokenWardenError::Config("oauth.client_secret must not be empty".into()));
        }
        if self.lifecycle.refresh_skew_secs < 0 {
            return Err(TokenWardenError::Config(
                "lifecycle.refresh_skew_secs must not be negative".into(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &crate::constants::REDACTED)
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "tokenwarden.db".to_string(),
            pool_size: 8,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
            client_id: String::new(),
            client_secret: String::new(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("tokenwarden/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            refresh_skew_secs: 0,
            operation_timeout_secs: default_operation_timeout_secs(),
            ephemeral_sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_operation_timeout_secs() -> u64 {
    30
}

fn default_sweep_interval_secs() -> u64 {
    300
}
