//! Application command permission payloads
//!
//! Shapes exchanged with the chat platform when a user-delegated token is
//! used to edit the permissions of a guild application command.

use serde::{Deserialize, Serialize};

/// Target kind of a command permission overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CommandPermissionType {
    Role,
    User,
    Channel,
}

impl TryFrom<u8> for CommandPermissionType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Role),
            2 => Ok(Self::User),
            3 => Ok(Self::Channel),
            other => Err(format!("unknown command permission type {other}")),
        }
    }
}

impl From<CommandPermissionType> for u8 {
    fn from(value: CommandPermissionType) -> Self {
        match value {
            CommandPermissionType::Role => 1,
            CommandPermissionType::User => 2,
            CommandPermissionType::Channel => 3,
        }
    }
}

/// A single allow/deny overwrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPermission {
    /// Snowflake of the role, user or channel.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CommandPermissionType,
    pub permission: bool,
}

/// Request body for editing a command's permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandPermissions {
    pub permissions: Vec<CommandPermission>,
}

/// Permissions of one command in one guild, as returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildCommandPermissions {
    pub id: String,
    pub application_id: String,
    pub guild_id: String,
    pub permissions: Vec<CommandPermission>,
}
