//! Guild command permission editing
//!
//! Requires a delegated bearer token with the
//! `applications.commands.permissions.update` scope. Obtain it from
//! `TokenLifecycleManager::get_valid_token`; absence means the user has to
//! re-authorize.

use reqwest::Method;
use tokenwarden_domain::{
    CommandPermissions, GuildCommandPermissions, Result, TokenRecord, TokenWardenError,
};
use tracing::{debug, info};

use crate::http::HttpClient;

pub struct CommandPermissionsClient {
    http_client: HttpClient,
    api_base_url: String,
}

impl CommandPermissionsClient {
    pub fn new(api_base_url: impl Into<String>, http_client: HttpClient) -> Self {
        let api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        Self { http_client, api_base_url }
    }

    /// Replace the permissions of one application command in one guild.
    ///
    /// Returns the permissions the API reports back, or `None` when the
    /// success body cannot be decoded (the API answers with no permissions).
    ///
    /// # Errors
    /// - `TokenWardenError::Exchange` for any non-success status
    /// - `TokenWardenError::Network` when the API is unreachable
    pub async fn edit_command_permissions(
        &self,
        application_id: u64,
        guild_id: u64,
        command_id: u64,
        permissions: &CommandPermissions,
        token: &TokenRecord,
    ) -> Result<Option<GuildCommandPermissions>> {
        let url = format!(
            "{}/applications/{application_id}/guilds/{guild_id}/commands/{command_id}/permissions",
            self.api_base_url
        );

        let request = self
            .http_client
            .request(Method::PUT, &url)
            .bearer_auth(&token.bearer_token)
            .json(permissions);

        let response = self.http_client.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TokenWardenError::Exchange { status: status.as_u16() });
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                debug!(error = %err, "failed to read permissions response body");
                return Ok(None);
            }
        };

        match serde_json::from_slice::<GuildCommandPermissions>(&body) {
            Ok(updated) => {
                info!(
                    user_id = %token.user_id,
                    guild_id,
                    command_id,
                    count = updated.permissions.len(),
                    "command permissions updated"
                );
                Ok(Some(updated))
            }
            Err(err) => {
                debug!(error = %err, "permissions response carried no permissions");
                Ok(None)
            }
        }
    }
}
