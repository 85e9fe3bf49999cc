//! Entry point bundling rules management and the stream session.

use crate::core::client::config::{ClientConfig, Endpoints};
use crate::core::client::executor::HttpExecutor;
use crate::core::client::rules::Rules;
use crate::core::client::stream::Stream;
use crate::core::error::Result;
use crate::core::traits::Network;
use std::sync::Arc;

/// Rules and stream clients sharing one authenticated executor.
///
/// ```no_run
/// # async fn example() -> twitstream::Result<()> {
/// use twitstream::{RuleBuilder, StreamQuery, TwitterApi};
///
/// let mut api = TwitterApi::new("bearer-token");
/// let rules = RuleBuilder::new().add_rule("cats has:images", "cat pictures").build();
/// api.rules.create(&rules, false).await?;
///
/// let messages = api.stream.messages();
/// api.stream.start(&StreamQuery::new().add_expansion("author_id")).await?;
/// while let Some(message) = messages.next().await {
///     match message.into_result() {
///         Ok(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
///         Err(e) if e.is_terminal() => break,
///         Err(e) => eprintln!("{}", e),
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TwitterApi {
    pub rules: Rules,
    pub stream: Stream,
}

impl TwitterApi {
    /// Client for the public API authenticated with `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self::from_executor(HttpExecutor::new(token))
    }

    /// Client with custom endpoints, retry and timeout settings.
    pub fn with_config(token: impl Into<String>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_executor(HttpExecutor::with_config(token, config)))
    }

    fn from_executor(executor: HttpExecutor) -> Self {
        let endpoints = executor.config().endpoints.clone();
        Self::with_network(Arc::new(executor), endpoints)
    }

    /// Client over any [`Network`] implementation.
    pub fn with_network(network: Arc<dyn Network>, endpoints: Endpoints) -> Self {
        TwitterApi {
            rules: Rules::new(network.clone(), endpoints.rules.clone()),
            stream: Stream::new(network, endpoints),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StreamError;

    #[test]
    fn test_new_uses_public_endpoints() {
        let api = TwitterApi::new("token");
        assert_eq!(
            api.rules.endpoint(),
            "https://api.twitter.com/2/tweets/search/stream/rules"
        );
    }

    #[test]
    fn test_with_config_routes_to_base() {
        let api = TwitterApi::with_config("token", ClientConfig::with_base_url("http://localhost:8080"))
            .unwrap();
        assert_eq!(
            api.rules.endpoint(),
            "http://localhost:8080/2/tweets/search/stream/rules"
        );
    }

    #[test]
    fn test_with_config_rejects_bad_endpoint() {
        let mut config = ClientConfig::default();
        config.endpoints.stream = "not a url".into();
        assert!(matches!(
            TwitterApi::with_config("token", config),
            Err(StreamError::Config(_))
        ));
    }
}
