//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for TokenWarden
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum TokenWardenError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Token endpoint returned HTTP {status}")]
    Exchange { status: u16 },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation timed out after {0}s")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse failure classes used for operability.
///
/// Callers of the lifecycle manager only ever see "no token"; the kind is
/// kept for logs so that operators can tell the cases apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No persisted record and no ephemeral entry.
    NotAuthorized,
    /// Store or token endpoint unreachable, or a non-success HTTP status.
    Transport,
    /// Token endpoint answered with an unexpected body.
    MalformedResponse,
    /// Persistent store rejected the operation.
    Storage,
    /// Invalid configuration or input.
    Configuration,
    /// Anything else.
    Internal,
}

impl TokenWardenError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotAuthorized,
            Self::Network(_) | Self::Exchange { .. } | Self::Timeout(_) => ErrorKind::Transport,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Database(_) => ErrorKind::Storage,
            Self::Config(_) | Self::InvalidInput(_) => ErrorKind::Configuration,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable label suitable for structured log fields.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Network(_) => "network",
            Self::Exchange { .. } => "exchange_status",
            Self::MalformedResponse(_) => "malformed_response",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Timeout(_) => "timeout",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for TokenWarden operations
pub type Result<T> = std::result::Result<T, TokenWardenError>;
