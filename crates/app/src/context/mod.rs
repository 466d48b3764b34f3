//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use tokenwarden_core::{
    spawn_ephemeral_sweeper, Clock, EphemeralTokenCache, SystemClock, TokenLifecycleManager,
};
use tokenwarden_domain::{Config, Result};
use tokenwarden_infra::{
    CommandPermissionsClient, DbManager, HttpClient, OAuthExchangeClient,
    SqliteTokenRecordRepository,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub records: Arc<SqliteTokenRecordRepository>,
    pub tokens: Arc<TokenLifecycleManager>,
    pub permissions: CommandPermissionsClient,

    shutdown: CancellationToken,
    sweeper: JoinHandle<()>,
}

impl AppContext {
    /// Wire every service from a validated configuration.
    ///
    /// Runs schema migrations and starts the ephemeral cache sweeper. Must be
    /// called inside a Tokio runtime.
    pub fn new_with_config(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Same as [`Self::new_with_config`] with an explicit time source.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;
        let records = Arc::new(SqliteTokenRecordRepository::new(Arc::clone(&db)));

        let http = HttpClient::from_config(&config.http)?;
        let exchange = Arc::new(OAuthExchangeClient::new(&config.oauth, &http));
        let permissions = CommandPermissionsClient::new(config.oauth.api_base_url.clone(), http);

        let ephemeral = Arc::new(EphemeralTokenCache::new());
        let tokens = TokenLifecycleManager::new(
            records.clone(),
            exchange,
            Arc::clone(&ephemeral),
            Arc::clone(&clock),
        )
        .with_refresh_skew(config.lifecycle.refresh_skew_secs)
        .with_operation_timeout(Duration::from_secs(config.lifecycle.operation_timeout_secs));

        let shutdown = CancellationToken::new();
        let sweeper = spawn_ephemeral_sweeper(
            ephemeral,
            clock,
            Duration::from_secs(config.lifecycle.ephemeral_sweep_interval_secs),
            shutdown.clone(),
        );

        info!(db_path = %db.path().display(), token_url = %config.oauth.token_url, "application context ready");

        Ok(Self { config, db, records, tokens: Arc::new(tokens), permissions, shutdown, sweeper })
    }

    /// Stop background tasks and wait for them to finish.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(err) = self.sweeper.await {
            tracing::warn!(error = %err, "ephemeral sweeper ended abnormally");
        }
        info!("application context shut down");
    }
}
