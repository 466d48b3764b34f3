//! Shared test helpers for `tokenwarden-core` integration tests.
//!
//! In-memory mocks for the store and exchange ports so lifecycle tests can
//! focus on behaviour and count every side effect.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokenwarden_core::{
    EphemeralTokenCache, MockClock, TokenExchangeClient, TokenLifecycleManager, TokenRecordStore,
};
use tokenwarden_domain::{
    Result as DomainResult, TokenExchangeResult, TokenRecord, TokenWardenError, UserId,
};

pub const NOW: i64 = 1_700_000_000;

/// In-memory mock for `TokenRecordStore`.
///
/// Counts reads and writes; reads and writes can each be switched into a
/// failing mode to simulate an unreachable database.
#[derive(Default)]
pub struct MockTokenStore {
    records: Mutex<HashMap<UserId, TokenRecord>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_reads: Mutex<bool>,
    fail_writes: Mutex<bool>,
}

impl MockTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record without counting it as a write.
    pub fn with_record(self, record: TokenRecord) -> Self {
        self.records.lock().unwrap().insert(record.user_id, record);
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    pub fn record(&self, user_id: UserId) -> Option<TokenRecord> {
        self.records.lock().unwrap().get(&user_id).cloned()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRecordStore for MockTokenStore {
    async fn find_by_user_id(&self, user_id: UserId) -> DomainResult<Option<TokenRecord>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if *self.fail_reads.lock().unwrap() {
            return Err(TokenWardenError::Database("database is locked".into()));
        }
        Ok(self.records.lock().unwrap().get(&user_id).cloned())
    }

    async fn save(&self, record: &TokenRecord) -> DomainResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if *self.fail_writes.lock().unwrap() {
            return Err(TokenWardenError::Database("disk I/O error".into()));
        }
        self.records.lock().unwrap().insert(record.user_id, record.clone());
        Ok(())
    }
}

/// Scripted mock for `TokenExchangeClient`.
///
/// Each successful call returns `access-N` / `refresh-N` where N is the
/// call number, so tests can tell exchanges apart.
pub struct MockExchangeClient {
    calls: AtomicUsize,
    received: Mutex<Vec<String>>,
    failure: Mutex<Option<TokenWardenError>>,
    expires_in: f64,
    delay: Duration,
}

impl MockExchangeClient {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            expires_in: 604_800.0,
            delay: Duration::ZERO,
        }
    }

    pub fn with_expires_in(mut self, expires_in: f64) -> Self {
        self.expires_in = expires_in;
        self
    }

    /// Hold each exchange open so concurrent callers overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_with(&self, error: TokenWardenError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Refresh tokens presented to the endpoint, in call order.
    pub fn received_refresh_tokens(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenExchangeClient for MockExchangeClient {
    async fn refresh_token_grant(&self, refresh_token: &str) -> DomainResult<TokenExchangeResult> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.received.lock().unwrap().push(refresh_token.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }

        Ok(TokenExchangeResult {
            access_token: format!("access-{call}"),
            token_type: Some("Bearer".into()),
            expires_in: self.expires_in,
            refresh_token: format!("refresh-{call}"),
            scope: Some("applications.commands.permissions.update".into()),
        })
    }
}

/// Wired-up manager plus handles to every collaborator.
pub struct Harness {
    pub manager: Arc<TokenLifecycleManager>,
    pub store: Arc<MockTokenStore>,
    pub exchange: Arc<MockExchangeClient>,
    pub ephemeral: Arc<EphemeralTokenCache>,
    pub clock: MockClock,
}

impl Harness {
    pub fn new(store: MockTokenStore, exchange: MockExchangeClient) -> Self {
        let store = Arc::new(store);
        let exchange = Arc::new(exchange);
        let ephemeral = Arc::new(EphemeralTokenCache::new());
        let clock = MockClock::at(NOW);

        let manager = TokenLifecycleManager::new(
            store.clone(),
            exchange.clone(),
            Arc::clone(&ephemeral),
            Arc::new(clock.clone()),
        );

        Self { manager: Arc::new(manager), store, exchange, ephemeral, clock }
    }

    /// Harness with a single persisted record.
    pub fn with_record(record: TokenRecord) -> Self {
        Self::new(MockTokenStore::new().with_record(record), MockExchangeClient::new())
    }
}

pub fn valid_record(user_id: UserId) -> TokenRecord {
    TokenRecord::new(user_id, "stored-access", "stored-refresh", NOW + 3600)
}

pub fn expired_record(user_id: UserId) -> TokenRecord {
    TokenRecord::new(user_id, "stale-access", "stale-refresh", NOW - 60)
}
