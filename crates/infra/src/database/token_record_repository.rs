//! SQLite-backed token record store
//!
//! One row per user. `save` is a single UPSERT statement, so a cancelled
//! refresh can never leave a half-written record behind.

use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};
use tokenwarden_core::TokenRecordStore;
use tokenwarden_domain::{Result as DomainResult, TokenRecord, UserId};
use tokio::task;
use tracing::debug;

use super::manager::{map_sql_error, DbManager};
use crate::errors::map_join_error;

/// SQLite implementation of `TokenRecordStore`
pub struct SqliteTokenRecordRepository {
    db: Arc<DbManager>,
}

impl SqliteTokenRecordRepository {
    /// Create a new repository instance
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Remove a user's record. Returns `true` if a row was deleted.
    pub async fn delete_by_user_id(&self, user_id: UserId) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let key = user_id.to_i64()?;

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let deleted = conn
                .execute("DELETE FROM token_records WHERE user_id = ?1", params![key])
                .map_err(map_sql_error)?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl TokenRecordStore for SqliteTokenRecordRepository {
    async fn find_by_user_id(&self, user_id: UserId) -> DomainResult<Option<TokenRecord>> {
        let db = Arc::clone(&self.db);
        let key = user_id.to_i64()?;

        task::spawn_blocking(move || -> DomainResult<Option<TokenRecord>> {
            let conn = db.get_connection()?;

            let row = conn
                .query_row(
                    "SELECT user_id, bearer_token, refresh_token, expires_at
                     FROM token_records WHERE user_id = ?1",
                    params![key],
                    map_token_record_row,
                )
                .optional()
                .map_err(map_sql_error)?;

            row.map(RawTokenRecord::into_record).transpose()
        })
        .await
        .map_err(map_join_error)?
    }

    async fn save(&self, record: &TokenRecord) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        let record = record.clone();
        let key = record.user_id.to_i64()?;

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO token_records (user_id, bearer_token, refresh_token, expires_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, CAST(strftime('%s','now') AS INTEGER))
                 ON CONFLICT(user_id) DO UPDATE SET
                    bearer_token = excluded.bearer_token,
                    refresh_token = excluded.refresh_token,
                    expires_at = excluded.expires_at,
                    updated_at = excluded.updated_at",
                params![key, record.bearer_token, record.refresh_token, record.expires_at],
            )
            .map_err(map_sql_error)?;

            debug!(user_id = %record.user_id, expires_at = record.expires_at, "token record saved");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

/// Row as stored; the user id is still the signed SQLite integer.
struct RawTokenRecord {
    user_id: i64,
    bearer_token: String,
    refresh_token: Option<String>,
    expires_at: i64,
}

impl RawTokenRecord {
    fn into_record(self) -> DomainResult<TokenRecord> {
        Ok(TokenRecord {
            user_id: UserId::from_i64(self.user_id)?,
            bearer_token: self.bearer_token,
            refresh_token: self.refresh_token,
            expires_at: self.expires_at,
        })
    }
}

fn map_token_record_row(row: &Row<'_>) -> rusqlite::Result<RawTokenRecord> {
    Ok(RawTokenRecord {
        user_id: row.get(0)?,
        bearer_token: row.get(1)?,
        refresh_token: row.get(2)?,
        expires_at: row.get(3)?,
    })
}
