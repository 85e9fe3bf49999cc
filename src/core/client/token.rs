//! App-only bearer token generation.
//!
//! Trades an API key and secret for a bearer token using the OAuth2 client
//! credentials grant. The request goes through an unauthenticated executor,
//! so rate-limit backoff applies to it like to any other request.
//!
//! ```no_run
//! # async fn example() -> twitstream::Result<()> {
//! use twitstream::{TokenGenerator, TwitterApi};
//!
//! let token = TokenGenerator::with_credentials("key", "secret")
//!     .request_bearer_token()
//!     .await?;
//! let api = TwitterApi::new(token.access_token);
//! # Ok(())
//! # }
//! ```

use crate::core::client::config::ClientConfig;
use crate::core::client::executor::HttpExecutor;
use crate::core::error::{Result, StreamError};
use crate::core::traits::Network;
use crate::core::types::RequestOptions;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const GRANT_BODY: &str = "grant_type=client_credentials";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// Token returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerToken {
    pub token_type: String,
    pub access_token: String,
}

/// Requests bearer tokens for one set of credentials.
#[derive(Clone)]
pub struct TokenGenerator {
    network: Arc<dyn Network>,
    endpoint: String,
    api_key: String,
    api_secret: String,
}

impl std::fmt::Debug for TokenGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGenerator")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

impl TokenGenerator {
    /// Generator using the default endpoint and client settings.
    pub fn with_credentials(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self::with_config(api_key, api_secret, ClientConfig::default())
    }

    pub fn with_config(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        config: ClientConfig,
    ) -> Self {
        let endpoint = config.endpoints.token.clone();
        let network = Arc::new(HttpExecutor::unauthenticated(config));
        Self::with_network(network, endpoint, api_key, api_secret)
    }

    /// Generator over any [`Network`], e.g. a mock.
    pub fn with_network(
        network: Arc<dyn Network>,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        TokenGenerator {
            network,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// `base64(key:secret)` for the Basic authorization header.
    fn encoded_credentials(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.api_key, self.api_secret))
    }

    pub async fn request_bearer_token(&self) -> Result<BearerToken> {
        if self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(StreamError::Config(
                "api key and secret are required to request a token".into(),
            ));
        }

        let mut opts = RequestOptions::post(self.endpoint.clone(), GRANT_BODY)
            .with_header("Content-Type", FORM_CONTENT_TYPE)
            .with_header("Authorization", format!("Basic {}", self.encoded_credentials()));

        let response = self.network.execute(&mut opts).await?;
        let token: BearerToken = response.json().await?;
        tracing::debug!(token_type = %token.token_type, "bearer token issued");
        Ok(token)
    }
}
