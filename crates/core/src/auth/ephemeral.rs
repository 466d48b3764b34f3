//! Ephemeral bearer token cache
//!
//! Holds tokens obtained outside the refresh-token flow (short-lived grants)
//! keyed by user. Entries live for one hour from their issue time and never
//! survive a restart. Stale entries are dropped lazily on lookup and by
//! [`EphemeralTokenCache::purge_expired`], which the background sweeper
//! calls periodically.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokenwarden_domain::{EphemeralEntry, UserId};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::clock::Clock;

/// Concurrency-safe map from user to ephemeral token
#[derive(Debug, Default)]
pub struct EphemeralTokenCache {
    entries: DashMap<UserId, EphemeralEntry>,
}

impl EphemeralTokenCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for a user.
    pub fn put(&self, user_id: UserId, token: impl Into<String>, issued_at: i64) {
        self.entries.insert(user_id, EphemeralEntry::new(user_id, token, issued_at));
        debug!(%user_id, issued_at, "ephemeral token stored");
    }

    /// Raw lookup; the caller judges staleness.
    #[must_use]
    pub fn try_get(&self, user_id: UserId) -> Option<EphemeralEntry> {
        self.entries.get(&user_id).map(|entry| entry.value().clone())
    }

    /// Lookup that only returns an entry still valid at `now`.
    ///
    /// A stale entry is removed on the way out unless a fresh one replaced
    /// it concurrently.
    #[must_use]
    pub fn get_valid(&self, user_id: UserId, now: i64) -> Option<EphemeralEntry> {
        match self.try_get(user_id) {
            Some(entry) if entry.is_valid_at(now) => Some(entry),
            Some(_) => {
                if self.entries.remove_if(&user_id, |_, entry| !entry.is_valid_at(now)).is_some() {
                    debug!(%user_id, "dropped stale ephemeral token");
                }
                None
            }
            None => None,
        }
    }

    /// Remove every entry that is no longer valid at `now`.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self, now: i64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_valid_at(now));
        before.saturating_sub(self.entries.len())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Periodically purge stale ephemeral tokens until `shutdown` fires.
pub fn spawn_ephemeral_sweeper(
    cache: Arc<EphemeralTokenCache>,
    clock: Arc<dyn Clock>,
    every: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_ms = every.as_millis() as u64, "ephemeral token sweeper started");

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = cache.purge_expired(clock.unix_seconds());
                    if removed > 0 {
                        debug!(removed, remaining = cache.len(), "swept stale ephemeral tokens");
                    }
                }
            }
        }

        info!("ephemeral token sweeper stopped");
    })
}
