//! Port interfaces for token persistence and exchange
//!
//! These traits define the boundaries between the lifecycle manager and the
//! infrastructure that stores records and talks to the OAuth provider.

use async_trait::async_trait;
use tokenwarden_domain::{Result, TokenExchangeResult, TokenRecord, UserId};

/// Durable storage of one token record per user
#[async_trait]
pub trait TokenRecordStore: Send + Sync {
    /// Get the record for a user, if one exists
    async fn find_by_user_id(&self, user_id: UserId) -> Result<Option<TokenRecord>>;

    /// Insert or overwrite the record for `record.user_id`
    ///
    /// The write must be atomic: either every token field is updated or
    /// none is.
    async fn save(&self, record: &TokenRecord) -> Result<()>;
}

/// Client for the provider's token endpoint
#[async_trait]
pub trait TokenExchangeClient: Send + Sync {
    /// Exchange a refresh token for a new access/refresh token pair
    ///
    /// # Errors
    /// - `TokenWardenError::Exchange` for a non-success HTTP status
    /// - `TokenWardenError::Network` if the endpoint is unreachable
    /// - `TokenWardenError::MalformedResponse` if the body lacks required
    ///   fields
    async fn refresh_token_grant(&self, refresh_token: &str) -> Result<TokenExchangeResult>;
}
