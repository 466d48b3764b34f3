//! Shared reqwest wrapper.
//!
//! Token exchanges must not be replayed, so callers decide how many attempts
//! a request gets. Only connection-level failures and 5xx responses are ever
//! retried.

use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tokenwarden_domain::{HttpConfig, Result, TokenWardenError};
use tracing::debug;

use crate::errors::InfraError;

/// HTTP client with a request timeout and optional retry.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Client configured from the `[http]` section. Single attempt.
    pub fn from_config(config: &HttpConfig) -> Result<Self> {
        Self::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
    }

    /// Start a request on the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    pub const fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Same connection pool, retries disabled.
    #[must_use]
    pub fn single_attempt(&self) -> Self {
        Self { client: self.client.clone(), max_attempts: 1, base_backoff: self.base_backoff }
    }

    /// Send the request, retrying transient failures up to the attempt limit.
    ///
    /// Non-success statuses other than 5xx are returned as responses; the
    /// caller decides what they mean.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let mut attempt = 1;

        loop {
            let request = builder
                .try_clone()
                .ok_or_else(|| TokenWardenError::Internal("request body is not cloneable".into()))?
                .build()
                .map_err(|err| TokenWardenError::from(InfraError::from(err)))?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt, %method, %url, "sending HTTP request");

            let retries_left = attempt < self.max_attempts;
            match self.client.execute(request).await {
                Ok(response) if response.status().is_server_error() && retries_left => {
                    debug!(attempt, %method, %url, status = %response.status(), "retrying server error");
                }
                Ok(response) => {
                    debug!(attempt, %method, %url, status = %response.status(), "received HTTP response");
                    return Ok(response);
                }
                Err(err) if retries_left && is_transient(&err) => {
                    debug!(attempt, %method, %url, error = %err, "retrying failed request");
                }
                Err(err) => return Err(InfraError::from(err).into()),
            }

            self.backoff(attempt).await;
            attempt += 1;
        }
    }

    async fn backoff(&self, attempt: usize) {
        let shift = u32::try_from(attempt.saturating_sub(1).min(8)).unwrap_or(8);
        let delay = self.base_backoff.saturating_mul(1 << shift);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 1,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total number of attempts (initial try + retries).
    #[must_use]
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| TokenWardenError::from(InfraError::from(err)))?;

        Ok(HttpClient { client, max_attempts: self.max_attempts, base_backoff: self.base_backoff })
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}
