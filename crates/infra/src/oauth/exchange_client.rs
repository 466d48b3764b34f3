//! Refresh-token grant against the provider's token endpoint.

use async_trait::async_trait;
use reqwest::Method;
use tokenwarden_core::TokenExchangeClient;
use tokenwarden_domain::constants::REFRESH_TOKEN_GRANT_TYPE;
use tokenwarden_domain::{OAuthConfig, Result, TokenExchangeResult, TokenWardenError};
use tracing::{debug, warn};

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Token endpoint client.
///
/// Sends exactly one request per exchange; a rotated refresh token must
/// never be presented twice.
pub struct OAuthExchangeClient {
    http_client: HttpClient,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl OAuthExchangeClient {
    pub fn new(config: &OAuthConfig, http_client: &HttpClient) -> Self {
        Self {
            http_client: http_client.single_attempt(),
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// Point the client at a different token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }
}

#[async_trait]
impl TokenExchangeClient for OAuthExchangeClient {
    async fn refresh_token_grant(&self, refresh_token: &str) -> Result<TokenExchangeResult> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", REFRESH_TOKEN_GRANT_TYPE),
            ("refresh_token", refresh_token),
        ];

        let request = self.http_client.request(Method::POST, &self.token_url).form(&form);
        let response = self.http_client.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "token endpoint rejected refresh grant");
            return Err(TokenWardenError::Exchange { status: status.as_u16() });
        }

        let body = response.bytes().await.map_err(|err| TokenWardenError::from(InfraError::from(err)))?;
        let result: TokenExchangeResult =
            serde_json::from_slice(&body).map_err(|err| TokenWardenError::from(InfraError::from(err)))?;

        if result.access_token.is_empty() || result.refresh_token.is_empty() {
            return Err(TokenWardenError::MalformedResponse(
                "token endpoint returned an empty token".into(),
            ));
        }

        debug!(expires_in = result.expires_in, token_type = ?result.token_type, "refresh grant succeeded");
        Ok(result)
    }
}
