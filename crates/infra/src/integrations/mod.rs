//! Downstream API calls made with a user's delegated token

pub mod command_permissions;

pub use command_permissions::CommandPermissionsClient;
