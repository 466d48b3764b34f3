//! Token types
//!
//! `TokenRecord` is the persisted per-user credential row, `EphemeralEntry`
//! the process-local short-lived grant, and `TokenExchangeResult` the
//! provider's answer to a refresh-token grant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{EPHEMERAL_TOKEN_TTL_SECS, REDACTED};
use crate::errors::{Result, TokenWardenError};

/// Chat-platform user identifier (snowflake).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl UserId {
    /// Convert to the signed representation used by SQLite.
    ///
    /// # Errors
    /// Returns `TokenWardenError::InvalidInput` if the id exceeds `i64::MAX`.
    pub fn to_i64(self) -> Result<i64> {
        i64::try_from(self.0).map_err(|_| {
            TokenWardenError::InvalidInput(format!("user id {} does not fit in i64", self.0))
        })
    }

    /// Rebuild from the signed SQLite representation.
    ///
    /// # Errors
    /// Returns `TokenWardenError::InvalidInput` for negative values.
    pub fn from_i64(value: i64) -> Result<Self> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| TokenWardenError::InvalidInput(format!("negative user id {value}")))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = TokenWardenError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| TokenWardenError::InvalidInput(format!("invalid user id '{s}': {e}")))
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Persisted OAuth credentials for one user.
///
/// `expires_at` is always an absolute unix timestamp in seconds. A record
/// synthesized from an ephemeral entry carries no refresh token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub user_id: UserId,
    pub bearer_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: i64,
}

impl TokenRecord {
    /// Create a persisted record.
    #[must_use]
    pub fn new(
        user_id: UserId,
        bearer_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: i64,
    ) -> Self {
        Self {
            user_id,
            bearer_token: bearer_token.into(),
            refresh_token: Some(refresh_token.into()),
            expires_at,
        }
    }

    /// Build the record handed out for a live ephemeral entry.
    #[must_use]
    pub fn from_ephemeral(entry: &EphemeralEntry) -> Self {
        Self {
            user_id: entry.user_id,
            bearer_token: entry.token.clone(),
            refresh_token: None,
            expires_at: entry.expires_at(),
        }
    }

    /// `true` once `now` has reached `expires_at - skew_secs`.
    #[must_use]
    pub fn is_expired_at(&self, now: i64, skew_secs: i64) -> bool {
        self.expires_at.saturating_sub(skew_secs) <= now
    }

    /// Seconds left before expiry; negative once expired.
    #[must_use]
    pub fn seconds_until_expiry(&self, now: i64) -> i64 {
        self.expires_at.saturating_sub(now)
    }

    /// Overwrite the token fields with a provider response.
    ///
    /// The provider may rotate the refresh token; whatever it returned
    /// replaces the stored one.
    pub fn apply_exchange(&mut self, result: &TokenExchangeResult, now: i64) {
        self.bearer_token.clone_from(&result.access_token);
        self.refresh_token = Some(result.refresh_token.clone());
        self.expires_at = result.absolute_expiry(now);
    }

    /// `true` if this record came from the ephemeral cache.
    #[must_use]
    pub const fn is_ephemeral(&self) -> bool {
        self.refresh_token.is_none()
    }

    /// Get the expiry as `DateTime<Utc>`
    #[must_use]
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }
}

impl fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRecord")
            .field("user_id", &self.user_id)
            .field("bearer_token", &REDACTED)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| REDACTED))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Process-local bearer token obtained outside the refresh-token flow.
#[derive(Clone, PartialEq, Eq)]
pub struct EphemeralEntry {
    pub user_id: UserId,
    /// Unix timestamp (seconds) at which the token was issued.
    pub issued_at: i64,
    pub token: String,
}

impl EphemeralEntry {
    #[must_use]
    pub fn new(user_id: UserId, token: impl Into<String>, issued_at: i64) -> Self {
        Self { user_id, issued_at, token: token.into() }
    }

    /// Hard expiry: issue time plus one hour.
    #[must_use]
    pub const fn expires_at(&self) -> i64 {
        self.issued_at.saturating_add(EPHEMERAL_TOKEN_TTL_SECS)
    }

    /// Usable strictly before `issued_at + 1h`.
    #[must_use]
    pub const fn is_valid_at(&self, now: i64) -> bool {
        self.expires_at() > now
    }
}

impl fmt::Debug for EphemeralEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralEntry")
            .field("user_id", &self.user_id)
            .field("issued_at", &self.issued_at)
            .field("token", &REDACTED)
            .finish()
    }
}

/// Token endpoint response for a refresh-token grant (RFC 6749 §5.1).
#[derive(Clone, Deserialize)]
pub struct TokenExchangeResult {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds; some providers send fractional values.
    pub expires_in: f64,
    pub refresh_token: String,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenExchangeResult {
    /// Absolute expiry for a response received at `now`.
    ///
    /// Fractional seconds are floored and nonsensical lifetimes (negative,
    /// NaN, infinite) count as zero.
    #[must_use]
    pub fn absolute_expiry(&self, now: i64) -> i64 {
        let lifetime = if self.expires_in.is_finite() && self.expires_in > 0.0 {
            // `as` saturates for out-of-range floats
            self.expires_in.floor() as i64
        } else {
            0
        };
        now.saturating_add(lifetime)
    }
}

impl fmt::Debug for TokenExchangeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenExchangeResult")
            .field("access_token", &REDACTED)
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &REDACTED)
            .field("scope", &self.scope)
            .finish()
    }
}
