//! Shared fixtures for infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokenwarden_core::{EphemeralTokenCache, MockClock, TokenLifecycleManager};
use tokenwarden_domain::{OAuthConfig, TokenRecord, UserId};
use tokenwarden_infra::{
    DbManager, HttpClient, OAuthExchangeClient, SqliteTokenRecordRepository,
};
use wiremock::MockServer;

pub const NOW: i64 = 1_700_000_000;
pub const TOKEN_PATH: &str = "/api/v10/oauth2/token";

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Fresh database with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("tokens.db");

        let manager = DbManager::new(&db_path, 4, Duration::from_millis(500))
            .expect("db manager should be created");
        manager.run_migrations().expect("schema migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    pub fn repository(&self) -> Arc<SqliteTokenRecordRepository> {
        Arc::new(SqliteTokenRecordRepository::new(Arc::clone(&self.manager)))
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle manager wired to SQLite and a wiremock token endpoint.
pub struct Stack {
    pub db: TestDatabase,
    pub repository: Arc<SqliteTokenRecordRepository>,
    pub manager: Arc<TokenLifecycleManager>,
    pub clock: MockClock,
}

impl Stack {
    pub fn new(server: &MockServer) -> Self {
        let db = TestDatabase::new();
        let repository = db.repository();
        let clock = MockClock::at(NOW);

        let oauth = OAuthConfig {
            token_url: format!("{}{TOKEN_PATH}", server.uri()),
            client_id: "client-123".into(),
            client_secret: "s3cret".into(),
            ..OAuthConfig::default()
        };
        let http = HttpClient::builder().timeout(Duration::from_secs(5)).build().expect("http");
        let exchange = Arc::new(OAuthExchangeClient::new(&oauth, &http));

        let manager = TokenLifecycleManager::new(
            repository.clone(),
            exchange,
            Arc::new(EphemeralTokenCache::new()),
            Arc::new(clock.clone()),
        );

        Self { db, repository, manager: Arc::new(manager), clock }
    }
}

pub fn expired_record(user_id: UserId) -> TokenRecord {
    TokenRecord::new(user_id, "stale-access", "stale-refresh", NOW - 60)
}

pub fn grant_response() -> serde_json::Value {
    serde_json::json!({
        "access_token": "fresh-access",
        "token_type": "Bearer",
        "expires_in": 604800,
        "refresh_token": "fresh-refresh",
        "scope": "applications.commands.permissions.update"
    })
}
