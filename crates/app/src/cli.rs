use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tokenwarden_domain::UserId;

#[derive(Parser)]
#[command(name = "tokenwarden")]
#[command(about = "Delegated OAuth token lifecycle for chat-platform integrations")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (JSON or TOML); environment variables win when complete
    #[arg(short, long, global = true, env = "TOKENWARDEN_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or upgrade the database schema
    Migrate,
    /// Print a valid token for a user, refreshing it if needed
    Token(TokenArgs),
    /// Exchange a user's refresh token even if the access token is valid
    Refresh(UserArgs),
    /// Replace a guild command's permissions on behalf of a user
    SetPermissions(SetPermissionsArgs),
}

#[derive(Args)]
pub struct UserArgs {
    /// User id (snowflake)
    pub user_id: UserId,
}

#[derive(Args)]
pub struct TokenArgs {
    /// User id (snowflake)
    pub user_id: UserId,
    /// Print the bearer token instead of redacting it
    #[arg(long)]
    pub reveal: bool,
}

#[derive(Args)]
pub struct SetPermissionsArgs {
    /// User whose delegated token is used
    pub user_id: UserId,
    #[arg(long)]
    pub application: u64,
    #[arg(long)]
    pub guild: u64,
    #[arg(long)]
    pub command: u64,
    /// JSON body, e.g. '{"permissions":[{"id":"1","type":1,"permission":true}]}'
    #[arg(long)]
    pub permissions: String,
}
