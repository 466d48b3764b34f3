//! Token lifecycle manager
//!
//! Produces a currently valid bearer token for a user:
//! 1. A live ephemeral token wins and never touches the store
//! 2. Otherwise the persisted record is loaded
//! 3. An expired (or force-refreshed) record is exchanged for new tokens
//!    and written back before it is returned
//!
//! Steps 2-3 run under a per-user guard so concurrent callers for the same
//! user collapse into a single exchange; callers that waited read the record
//! the first caller persisted.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokenwarden_domain::{Result, TokenRecord, TokenWardenError, UserId};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use super::ephemeral::EphemeralTokenCache;
use super::ports::{TokenExchangeClient, TokenRecordStore};
use crate::clock::Clock;

const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of the refresh decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Token still valid, no exchange was made
    Unchanged,
    /// Token exchanged; the record must be persisted
    Refreshed,
}

impl RefreshOutcome {
    #[must_use]
    pub const fn is_updated(self) -> bool {
        matches!(self, Self::Refreshed)
    }
}

/// Issues, caches and refreshes delegated OAuth tokens per user
pub struct TokenLifecycleManager {
    store: Arc<dyn TokenRecordStore>,
    exchange: Arc<dyn TokenExchangeClient>,
    ephemeral: Arc<EphemeralTokenCache>,
    clock: Arc<dyn Clock>,
    refresh_locks: DashMap<UserId, Arc<Mutex<()>>>,
    refresh_skew_secs: i64,
    operation_timeout: Duration,
}

impl TokenLifecycleManager {
    /// Create a new lifecycle manager
    ///
    /// # Arguments
    /// * `store` - Persistent token record store
    /// * `exchange` - Client for the provider's token endpoint
    /// * `ephemeral` - Shared ephemeral token cache, populated by
    ///   authorization flows
    /// * `clock` - Time source for every expiry decision
    pub fn new(
        store: Arc<dyn TokenRecordStore>,
        exchange: Arc<dyn TokenExchangeClient>,
        ephemeral: Arc<EphemeralTokenCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            exchange,
            ephemeral,
            clock,
            refresh_locks: DashMap::new(),
            refresh_skew_secs: 0,
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Refresh persisted tokens this many seconds before they expire.
    #[must_use]
    pub fn with_refresh_skew(mut self, secs: i64) -> Self {
        self.refresh_skew_secs = secs.max(0);
        self
    }

    /// Upper bound for one store-read/exchange/store-write cycle.
    #[must_use]
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// The ephemeral cache authorization flows insert into.
    #[must_use]
    pub fn ephemeral(&self) -> &Arc<EphemeralTokenCache> {
        &self.ephemeral
    }

    /// Get a valid token for a user.
    ///
    /// Every failure (store unreachable, exchange rejected, malformed
    /// response, timeout) is logged with its kind and reported as `None`,
    /// exactly like a user that never authorized. Callers should ask the
    /// user to (re-)authorize and must not keep the token past
    /// `expires_at`.
    pub async fn get_valid_token(&self, user_id: UserId) -> Option<TokenRecord> {
        self.try_get_valid_token(user_id).await.unwrap_or_else(|err| {
            warn!(
                %user_id,
                error = %err,
                error_label = err.label(),
                error_kind = ?err.kind(),
                "failed to get or refresh delegated token"
            );
            None
        })
    }

    /// Fallible variant of [`Self::get_valid_token`].
    ///
    /// # Errors
    /// Returns the store, exchange or timeout error that prevented a token
    /// from being produced.
    pub async fn try_get_valid_token(&self, user_id: UserId) -> Result<Option<TokenRecord>> {
        let now = self.clock.unix_seconds();

        if let Some(entry) = self.ephemeral.get_valid(user_id, now) {
            debug!(%user_id, expires_at = entry.expires_at(), "using ephemeral token");
            return Ok(Some(TokenRecord::from_ephemeral(&entry)));
        }

        self.with_timeout(self.load_and_refresh(user_id, false)).await
    }

    /// Exchange the stored refresh token even if the access token is valid.
    ///
    /// Ephemeral tokens are not consulted. Failures collapse to `None` like
    /// [`Self::get_valid_token`].
    pub async fn force_refresh(&self, user_id: UserId) -> Option<TokenRecord> {
        self.try_force_refresh(user_id).await.unwrap_or_else(|err| {
            warn!(
                %user_id,
                error = %err,
                error_label = err.label(),
                error_kind = ?err.kind(),
                "forced token refresh failed"
            );
            None
        })
    }

    /// Fallible variant of [`Self::force_refresh`].
    ///
    /// # Errors
    /// Returns the store, exchange or timeout error encountered.
    pub async fn try_force_refresh(&self, user_id: UserId) -> Result<Option<TokenRecord>> {
        self.with_timeout(self.load_and_refresh(user_id, true)).await
    }

    /// Refresh decision for a single record.
    ///
    /// Without `force`, a record whose `expires_at` is still in the future
    /// is returned untouched and no network call is made. Otherwise the
    /// stored refresh token is exchanged and the record's bearer token,
    /// refresh token and absolute expiry are replaced with the provider's
    /// answer. Errors from the exchange are returned as-is, never retried.
    ///
    /// # Errors
    /// - `TokenWardenError::InvalidInput` if the record has no refresh token
    /// - Any error from the [`TokenExchangeClient`]
    pub async fn refresh(
        &self,
        mut record: TokenRecord,
        force: bool,
    ) -> Result<(TokenRecord, RefreshOutcome)> {
        let now = self.clock.unix_seconds();
        if !force && !record.is_expired_at(now, self.refresh_skew_secs) {
            return Ok((record, RefreshOutcome::Unchanged));
        }

        let refresh_token =
            record.refresh_token.as_deref().filter(|token| !token.is_empty()).ok_or_else(|| {
                TokenWardenError::InvalidInput(format!(
                    "no refresh token stored for user {}",
                    record.user_id
                ))
            })?;

        debug!(
            user_id = %record.user_id,
            force,
            expires_at = record.expires_at,
            "exchanging refresh token"
        );
        let response = self.exchange.refresh_token_grant(refresh_token).await?;

        record.apply_exchange(&response, self.clock.unix_seconds());
        Ok((record, RefreshOutcome::Refreshed))
    }

    /// Number of users that currently hold or wait for a refresh guard.
    #[must_use]
    pub fn active_refresh_guards(&self) -> usize {
        self.refresh_locks.len()
    }

    async fn load_and_refresh(&self, user_id: UserId, force: bool) -> Result<Option<TokenRecord>> {
        let _guard = self.acquire_refresh_guard(user_id).await;

        let Some(record) = self.store.find_by_user_id(user_id).await? else {
            debug!(%user_id, "no stored token record");
            return Ok(None);
        };

        let (record, outcome) = self.refresh(record, force).await?;
        if outcome.is_updated() {
            self.store.save(&record).await?;
            info!(%user_id, expires_at = record.expires_at, "refreshed delegated token");
        }

        Ok(Some(record))
    }

    async fn acquire_refresh_guard(&self, user_id: UserId) -> RefreshGuard<'_> {
        let lock = self
            .refresh_locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        // The guard owns its reference before waiting, so a caller dropped
        // mid-wait still runs the cleanup in `Drop`.
        let mut guard =
            RefreshGuard { locks: &self.refresh_locks, user_id, lock: Some(lock), held: None };
        if let Some(lock) = guard.lock.clone() {
            guard.held = Some(lock.lock_owned().await);
        }
        guard
    }

    async fn with_timeout<F>(&self, operation: F) -> Result<Option<TokenRecord>>
    where
        F: std::future::Future<Output = Result<Option<TokenRecord>>>,
    {
        tokio::time::timeout(self.operation_timeout, operation)
            .await
            .unwrap_or(Err(TokenWardenError::Timeout(self.operation_timeout.as_secs())))
    }
}

/// Holds a user's refresh lock; drops the map entry once nobody else wants it.
struct RefreshGuard<'a> {
    locks: &'a DashMap<UserId, Arc<Mutex<()>>>,
    user_id: UserId,
    lock: Option<Arc<Mutex<()>>>,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        drop(self.held.take());
        drop(self.lock.take());
        self.locks.remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
