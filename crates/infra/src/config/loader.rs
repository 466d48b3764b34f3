//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Attempt to build the configuration from environment variables
//! 2. If a required variable is missing, fall back to a config file
//! 3. Validate whichever configuration was produced
//!
//! ## Environment Variables
//! Required:
//! - `TOKENWARDEN_DB_PATH`: SQLite database file
//! - `TOKENWARDEN_DB_POOL_SIZE`: Connection pool size
//! - `TOKENWARDEN_OAUTH_CLIENT_ID`: OAuth application id
//! - `TOKENWARDEN_OAUTH_CLIENT_SECRET`: OAuth application secret
//!
//! Optional:
//! - `TOKENWARDEN_OAUTH_TOKEN_URL`: Token endpoint
//! - `TOKENWARDEN_API_BASE_URL`: Base URL for downstream API calls
//! - `TOKENWARDEN_HTTP_TIMEOUT_SECS`: Outbound request timeout
//! - `TOKENWARDEN_REFRESH_SKEW_SECS`: Refresh persisted tokens early
//! - `TOKENWARDEN_OPERATION_TIMEOUT_SECS`: Bound on one token lookup
//!
//! ## File Locations
//! `tokenwarden.{json,toml}` then `config.{json,toml}`, looked up in the
//! working directory, its parent, and next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tokenwarden_domain::{
    Config, DatabaseConfig, HttpConfig, LifecycleConfig, OAuthConfig, Result, TokenWardenError,
};

const FILE_NAMES: [&str; 4] = ["tokenwarden.json", "tokenwarden.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `TokenWardenError::Config` if neither source yields a valid
/// configuration.
pub fn load() -> Result<Config> {
    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment variables");
            config
        }
        Err(err) => {
            tracing::debug!(error = %err, "environment incomplete, trying config file");
            load_from_file(None)?
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `TokenWardenError::Config` if a required variable is missing or
/// any variable has an unparsable value.
pub fn load_from_env() -> Result<Config> {
    let database = DatabaseConfig {
        path: env_var("TOKENWARDEN_DB_PATH")?,
        pool_size: env_parse("TOKENWARDEN_DB_POOL_SIZE")?,
        ..DatabaseConfig::default()
    };

    let mut oauth = OAuthConfig {
        client_id: env_var("TOKENWARDEN_OAUTH_CLIENT_ID")?,
        client_secret: env_var("TOKENWARDEN_OAUTH_CLIENT_SECRET")?,
        ..OAuthConfig::default()
    };
    if let Some(url) = env_opt("TOKENWARDEN_OAUTH_TOKEN_URL") {
        oauth.token_url = url;
    }
    if let Some(url) = env_opt("TOKENWARDEN_API_BASE_URL") {
        oauth.api_base_url = url;
    }

    let mut http = HttpConfig::default();
    if env_opt("TOKENWARDEN_HTTP_TIMEOUT_SECS").is_some() {
        http.timeout_secs = env_parse("TOKENWARDEN_HTTP_TIMEOUT_SECS")?;
    }

    let mut lifecycle = LifecycleConfig::default();
    if env_opt("TOKENWARDEN_REFRESH_SKEW_SECS").is_some() {
        lifecycle.refresh_skew_secs = env_parse("TOKENWARDEN_REFRESH_SKEW_SECS")?;
    }
    if env_opt("TOKENWARDEN_OPERATION_TIMEOUT_SECS").is_some() {
        lifecycle.operation_timeout_secs = env_parse("TOKENWARDEN_OPERATION_TIMEOUT_SECS")?;
    }

    Ok(Config { database, oauth, http, lifecycle })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format follows the
/// file extension.
///
/// # Errors
/// Returns `TokenWardenError::Config` if the file is missing, unreadable or
/// invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) if !p.exists() => {
            return Err(TokenWardenError::Config(format!("config file not found: {}", p.display())))
        }
        Some(p) => p,
        None => probe_config_paths().ok_or_else(|| {
            TokenWardenError::Config("no config file found in any standard location".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TokenWardenError::Config(format!("failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TokenWardenError::Config(format!("invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TokenWardenError::Config(format!("invalid JSON format: {e}"))),
        other => Err(TokenWardenError::Config(format!("unsupported config format: {other}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.join(".."));
        dirs.insert(0, cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        TokenWardenError::Config(format!("missing required environment variable: {key}"))
    })
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env_var(key)?;
    raw.trim().parse().map_err(|e| TokenWardenError::Config(format!("invalid value for {key}: {e}")))
}
