//! Configuration for the filtered-stream client.
//!
//! [`ClientConfig`] controls the endpoint table, rate-limit retry behaviour,
//! connection timeouts and logging of one client instance. The endpoint table
//! is an immutable value owned by the client, so two clients pointed at
//! different hosts never interfere with each other.
//!
//! # Configuration Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `endpoints` | public API | Rules, stream and token URLs |
//! | `max_retries` | `None` | Cap on 429 retries (`None` = retry forever) |
//! | `backoff_ceiling_secs` | 30 | Longest single backoff sleep |
//! | `connection_timeout_secs` | 30 | Connection timeout |
//! | `enable_logging` | true | Log rate-limit retries |
//! | `user_agent` | `twitstream/<version>` | `User-Agent` header |
//!
//! # Examples
//!
//! ```
//! use twitstream::ClientConfig;
//!
//! let config = ClientConfig {
//!     max_retries: Some(5),
//!     ..Default::default()
//! };
//! assert_eq!(config.backoff_ceiling_secs, 30);
//! ```

use crate::core::error::{Result, StreamError};
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

pub const DEFAULT_RULES_URL: &str = "https://api.twitter.com/2/tweets/search/stream/rules";
pub const DEFAULT_STREAM_URL: &str = "https://api.twitter.com/2/tweets/search/stream";
pub const DEFAULT_TOKEN_URL: &str = "https://api.twitter.com/oauth2/token";

/// The URLs a client talks to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub rules: String,
    pub stream: String,
    pub token: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES_URL.to_string(),
            stream: DEFAULT_STREAM_URL.to_string(),
            token: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every endpoint at `base`, keeping the public API paths.
    ///
    /// Mostly useful for tests against a local mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            rules: format!("{}/2/tweets/search/stream/rules", base),
            stream: format!("{}/2/tweets/search/stream", base),
            token: format!("{}/oauth2/token", base),
        }
    }

    /// Check that every endpoint parses as an absolute URL.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("rules", &self.rules),
            ("stream", &self.stream),
            ("token", &self.token),
        ] {
            Url::parse(value)
                .map_err(|e| StreamError::Config(format!("{} endpoint {:?}: {}", name, value, e)))?;
        }
        Ok(())
    }
}

/// Configuration for one client instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub endpoints: Endpoints,

    /// Maximum number of 429 retries for one logical request.
    ///
    /// `None` keeps retrying for as long as the server rate limits.
    pub max_retries: Option<u32>,

    /// Upper bound, in seconds, of a single backoff sleep.
    pub backoff_ceiling_secs: u64,

    /// Maximum time to wait for a connection to be established.
    ///
    /// No overall request timeout is applied; the stream request never
    /// finishes on its own.
    pub connection_timeout_secs: u64,

    /// Log rate-limit retries and failed requests through `tracing`.
    pub enable_logging: bool,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoints: Endpoints::default(),
            max_retries: None,
            backoff_ceiling_secs: 30,
            connection_timeout_secs: 30,
            enable_logging: true,
            user_agent: concat!("twitstream/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Default configuration with every endpoint rooted at `base`.
    pub fn with_base_url(base: &str) -> Self {
        Self {
            endpoints: Endpoints::with_base(base),
            ..Default::default()
        }
    }

    /// Load a JSON configuration file. Missing fields take their defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path.as_ref()).await?;
        let config: ClientConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.endpoints.validate()?;
        if self.backoff_ceiling_secs == 0 {
            return Err(StreamError::Config(
                "backoff_ceiling_secs must be greater than zero".to_string(),
            ));
        }
        HeaderValue::from_str(&self.user_agent).map_err(|e| {
            StreamError::Config(format!("user_agent {:?}: {}", self.user_agent, e))
        })?;
        Ok(())
    }
}
