//! CLI command handlers
//!
//! Handlers return a [`CommandOutput`] instead of printing so the binary
//! owns stdout and exit codes.

use anyhow::Context as _;
use serde_json::{json, Value};
use tokenwarden_domain::constants::REDACTED;
use tokenwarden_domain::{CommandPermissions, TokenRecord, UserId};
use tracing::info;

use crate::cli::{SetPermissionsArgs, TokenArgs, UserArgs};
use crate::context::AppContext;

/// Result of a command, rendered by `main`.
#[derive(Debug, PartialEq)]
pub enum CommandOutput {
    /// Print the value as pretty JSON, exit 0.
    Success(Value),
    /// The user has no usable token and must authorize again; exit 1.
    NeedsAuthorization(UserId),
}

impl CommandOutput {
    pub fn authorization_hint(user_id: UserId) -> String {
        format!(
            "no valid token for user {user_id}: please re-authorize the application to manage \
             command permissions"
        )
    }
}

pub fn migrate(ctx: &AppContext) -> anyhow::Result<CommandOutput> {
    ctx.db.run_migrations().context("running migrations")?;
    ctx.db.health_check().context("database health check")?;
    Ok(CommandOutput::Success(json!({ "database": ctx.db.path().display().to_string(), "migrated": true })))
}

pub async fn token(ctx: &AppContext, args: &TokenArgs) -> anyhow::Result<CommandOutput> {
    Ok(match ctx.tokens.get_valid_token(args.user_id).await {
        Some(record) => CommandOutput::Success(describe(&record, args.reveal)),
        None => CommandOutput::NeedsAuthorization(args.user_id),
    })
}

pub async fn refresh(ctx: &AppContext, args: &UserArgs) -> anyhow::Result<CommandOutput> {
    Ok(match ctx.tokens.force_refresh(args.user_id).await {
        Some(record) => {
            info!(user_id = %record.user_id, "forced refresh complete");
            CommandOutput::Success(describe(&record, false))
        }
        None => CommandOutput::NeedsAuthorization(args.user_id),
    })
}

pub async fn set_permissions(
    ctx: &AppContext,
    args: &SetPermissionsArgs,
) -> anyhow::Result<CommandOutput> {
    let permissions: CommandPermissions =
        serde_json::from_str(&args.permissions).context("--permissions is not valid JSON")?;

    let Some(token) = ctx.tokens.get_valid_token(args.user_id).await else {
        return Ok(CommandOutput::NeedsAuthorization(args.user_id));
    };

    let updated = ctx
        .permissions
        .edit_command_permissions(args.application, args.guild, args.command, &permissions, &token)
        .await
        .context("editing command permissions")?;

    Ok(CommandOutput::Success(match updated {
        Some(updated) => serde_json::to_value(updated)?,
        None => json!({ "permissions": [] }),
    }))
}

fn describe(record: &TokenRecord, reveal: bool) -> Value {
    let bearer = if reveal { record.bearer_token.as_str() } else { REDACTED };
    json!({
        "user_id": record.user_id,
        "bearer_token": bearer,
        "expires_at": record.expires_at,
        "expires_at_utc": record.expires_at_utc().map(|at| at.to_rfc3339()),
        "ephemeral": record.is_ephemeral(),
    })
}
