//! Authenticated request executor with rate-limit backoff.
//!
//! [`HttpExecutor`] is the `reqwest`-backed [`Network`]. Every request gets a
//! JSON content type, the caller's extra headers and, when the executor holds
//! a token, a bearer `Authorization` header. A 429 answer is retried after
//! [`backoff_delay`](super::retry::backoff_delay); any other answer >= 400
//! fails with [`StreamError::Network`] carrying the response body.

use crate::core::client::config::ClientConfig;
use crate::core::client::retry::{RetryDecision, RetryPolicy};
use crate::core::client::utils;
use crate::core::error::{Result, StreamError};
use crate::core::traits::Network;
use crate::core::types::{HttpResponse, RequestOptions};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Issues requests with an optional bearer token and retries on 429.
#[derive(Clone)]
pub struct HttpExecutor {
    client: Client,
    token: Option<String>,
    config: Arc<ClientConfig>,
}

impl std::fmt::Debug for HttpExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExecutor")
            .field("has_token", &self.token.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl HttpExecutor {
    /// Create an executor that authenticates with `token`.
    ///
    /// An empty token yields an unauthenticated executor.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_config(token, ClientConfig::default())
    }

    /// Create an executor that sends no `Authorization` header of its own.
    pub fn unauthenticated(config: ClientConfig) -> Self {
        Self::with_config(String::new(), config)
    }

    pub fn with_config(token: impl Into<String>, config: ClientConfig) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connection_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("falling back to a default HTTP client: {}", e);
                Client::default()
            });
        Self::with_client(client, token, config)
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client, token: impl Into<String>, config: ClientConfig) -> Self {
        let token = token.into();
        HttpExecutor {
            client,
            token: (!token.is_empty()).then_some(token),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[inline]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.config.max_retries,
            ceiling: Duration::from_secs(self.config.backoff_ceiling_secs),
        }
    }

    /// Headers for one attempt: content type, caller headers, then the
    /// bearer token. Later entries replace earlier ones.
    fn build_headers(&self, opts: &RequestOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

        for (key, value) in &opts.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| StreamError::Config(format!("invalid header name {:?}: {}", key, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| StreamError::Config(format!("invalid value for {}: {}", key, e)))?;
            headers.insert(name, value);
        }

        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| StreamError::Config(format!("invalid bearer token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    async fn send_once(&self, opts: &RequestOptions) -> Result<reqwest::Response> {
        let mut req_builder = self
            .client
            .request(opts.method.clone(), &opts.url)
            .headers(self.build_headers(opts)?);

        if opts.has_body() {
            req_builder = req_builder.body(opts.body.clone());
        }

        req_builder.send().await.map_err(|e| {
            tracing::warn!(url = %opts.url, "failed to perform request: {}", e);
            StreamError::Transport(e.to_string())
        })
    }
}

#[async_trait]
impl Network for HttpExecutor {
    async fn execute(&self, opts: &mut RequestOptions) -> Result<HttpResponse> {
        let policy = self.retry_policy();

        loop {
            tracing::debug!(method = %opts.method, url = %opts.url, retries = opts.retries, "issuing request");
            let response = self.send_once(opts).await?;
            let status = response.status();
            tracing::debug!(url = %opts.url, %status, "response received");

            if status == StatusCode::TOO_MANY_REQUESTS {
                match policy.on_rate_limited(opts.retries) {
                    RetryDecision::Retry(delay) => {
                        if self.config.enable_logging {
                            tracing::warn!(
                                "Request to {} rate limited (retry {}), backing off for {:?}",
                                opts.url,
                                opts.retries + 1,
                                delay
                            );
                        }
                        drop(response);
                        utils::sleep(delay).await;
                        opts.retries += 1;
                        continue;
                    }
                    RetryDecision::DontRetry => {
                        return Err(StreamError::RateLimited {
                            retries: opts.retries,
                        });
                    }
                }
            }

            if status.as_u16() >= 400 {
                let body = response.text().await.unwrap_or_default();
                if self.config.enable_logging {
                    tracing::warn!("Network request at {} failed: {}", opts.url, status);
                }
                return Err(StreamError::Network {
                    status: status.as_u16(),
                    body,
                });
            }

            return Ok(HttpResponse::from_reqwest(response));
        }
    }
}
