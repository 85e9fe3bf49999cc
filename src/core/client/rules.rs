//! Filtered-stream rule management.
//!
//! Rules decide which posts the stream delivers. They are listed with a GET
//! on the rules endpoint; creation and deletion both POST a JSON body to the
//! same endpoint, optionally as a dry run that validates without applying.

use crate::core::client::rule_builder::{CreateRulesRequest, DeleteRulesRequest};
use crate::core::client::utils;
use crate::core::error::Result;
use crate::core::traits::Network;
use crate::core::types::RequestOptions;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A rule as stored by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleData {
    pub value: String,
    pub tag: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSummary {
    pub created: u32,
    pub not_created: u32,
    pub deleted: u32,
    pub not_deleted: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleMeta {
    /// Timestamp of the answer.
    pub sent: String,
    pub summary: RuleSummary,
}

/// A rule the API refused, e.g. a duplicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleError {
    pub value: String,
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Answer to every rules request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleResponse {
    pub data: Vec<RuleData>,
    pub meta: RuleMeta,
    pub errors: Vec<RuleError>,
}

impl RuleResponse {
    #[inline]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Rules client bound to one endpoint.
#[derive(Clone)]
pub struct Rules {
    network: Arc<dyn Network>,
    endpoint: String,
}

impl std::fmt::Debug for Rules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rules")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Rules {
    pub fn new(network: Arc<dyn Network>, endpoint: impl Into<String>) -> Self {
        Rules {
            network,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// List the active rules.
    pub async fn get(&self) -> Result<RuleResponse> {
        let mut opts = RequestOptions::get(utils::url_with_dry_run(&self.endpoint, false)?);
        let response = self.network.execute(&mut opts).await?;
        response.json().await
    }

    /// Add rules. With `dry_run` the API validates them without applying.
    pub async fn create(&self, request: &CreateRulesRequest, dry_run: bool) -> Result<RuleResponse> {
        let body = serde_json::to_vec(request)?;
        self.post(body, dry_run).await
    }

    /// Remove rules by id.
    pub async fn delete(&self, request: &DeleteRulesRequest, dry_run: bool) -> Result<RuleResponse> {
        let body = serde_json::to_vec(request)?;
        self.post(body, dry_run).await
    }

    async fn post(&self, body: Vec<u8>, dry_run: bool) -> Result<RuleResponse> {
        let url = utils::url_with_dry_run(&self.endpoint, dry_run)?;
        let mut opts = RequestOptions::post(url, body);
        let response = self.network.execute(&mut opts).await?;
        let response: RuleResponse = response.json().await?;
        if response.has_errors() {
            tracing::debug!(errors = response.errors.len(), dry_run, "rules request partially rejected");
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::client::rule_builder::RuleBuilder;
    use crate::core::error::StreamError;
    use crate::core::types::HttpResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records each request and answers with a canned JSON body.
    struct Recorder {
        answer: &'static str,
        seen: Mutex<Vec<(String, String, String)>>,
    }

    impl Recorder {
        fn new(answer: &'static str) -> Arc<Self> {
            Arc::new(Recorder {
                answer,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last(&self) -> (String, String, String) {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Network for Recorder {
        async fn execute(&self, opts: &mut RequestOptions) -> Result<HttpResponse> {
            self.seen.lock().unwrap().push((
                opts.method.to_string(),
                opts.url.clone(),
                String::from_utf8_lossy(&opts.body).into_owned(),
            ));
            Ok(HttpResponse::from_bytes(200, self.answer))
        }
    }

    const ENDPOINT: &str = "https://api.example.com/2/tweets/search/stream/rules";

    const CREATED: &str = r#"{
        "data": [{"value": "cats", "tag": "cat tweets", "id": "1"}],
        "meta": {"sent": "2021-02-01T00:00:00.000Z", "summary": {"created": 1, "not_created": 0}}
    }"#;

    #[tokio::test]
    async fn test_get_uses_plain_get() {
        let network = Recorder::new(CREATED);
        let rules = Rules::new(network.clone(), ENDPOINT);

        let response = rules.get().await.unwrap();
        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].id, "1");

        let (method, url, body) = network.last();
        assert_eq!(method, "GET");
        assert_eq!(url, ENDPOINT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_create_posts_rules() {
        let network = Recorder::new(CREATED);
        let rules = Rules::new(network.clone(), ENDPOINT);
        let request = RuleBuilder::new().add_rule("cats", "cat tweets").build();

        let response = rules.create(&request, false).await.unwrap();
        assert_eq!(response.meta.summary.created, 1);
        assert!(!response.has_errors());

        let (method, url, body) = network.last();
        assert_eq!(method, "POST");
        assert_eq!(url, ENDPOINT);
        assert_eq!(body, r#"{"add":[{"value":"cats","tag":"cat tweets"}]}"#);
    }

    #[tokio::test]
    async fn test_create_dry_run() {
        let network = Recorder::new(CREATED);
        let rules = Rules::new(network.clone(), ENDPOINT);
        let request = RuleBuilder::new().add_rule("cats", "cat tweets").build();

        rules.create(&request, true).await.unwrap();
        let (_, url, _) = network.last();
        assert_eq!(url, format!("{}?dry_run=true", ENDPOINT));
    }

    #[tokio::test]
    async fn test_delete_posts_ids() {
        let network = Recorder::new(
            r#"{"meta": {"sent": "now", "summary": {"deleted": 2, "not_deleted": 0}}}"#,
        );
        let rules = Rules::new(network.clone(), ENDPOINT);

        let response = rules
            .delete(&DeleteRulesRequest::new(["1", "2"]), false)
            .await
            .unwrap();
        assert!(response.data.is_empty());
        assert_eq!(response.meta.summary.deleted, 2);

        let (method, _, body) = network.last();
        assert_eq!(method, "POST");
        assert_eq!(body, r#"{"delete":{"ids":["1","2"]}}"#);
    }

    #[tokio::test]
    async fn test_rejected_rules_are_reported() {
        let network = Recorder::new(
            r#"{
                "meta": {"sent": "now", "summary": {"created": 0, "not_created": 1}},
                "errors": [{"value": "cats", "id": "1", "title": "DuplicateRule", "type": "https://api.twitter.com/2/problems/duplicate-rules"}]
            }"#,
        );
        let rules = Rules::new(network, ENDPOINT);
        let request = RuleBuilder::new().add_rule("cats", "cat tweets").build();

        let response = rules.create(&request, false).await.unwrap();
        assert!(response.has_errors());
        assert_eq!(response.errors[0].title, "DuplicateRule");
        assert_eq!(response.meta.summary.not_created, 1);
    }

    #[tokio::test]
    async fn test_malformed_answer_is_json_error() {
        let rules = Rules::new(Recorder::new("not json"), ENDPOINT);
        assert!(matches!(rules.get().await, Err(StreamError::Json(_))));
    }
}
