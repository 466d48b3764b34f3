//! Domain constants
//!
//! Centralized location for the fixed values the token lifecycle relies on.

/// Validity window of an ephemeral bearer token, counted from its issue time.
pub const EPHEMERAL_TOKEN_TTL_SECS: i64 = 3600;

/// OAuth grant type used when exchanging a refresh token.
pub const REFRESH_TOKEN_GRANT_TYPE: &str = "refresh_token";

/// Default chat-platform OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://discord.com/api/v10/oauth2/token";

/// Default chat-platform REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://discord.com/api/v10";

/// Placeholder used instead of token material in `Debug` output.
pub const REDACTED: &str = "[redacted]";
