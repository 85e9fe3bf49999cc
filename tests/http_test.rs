use std::time::Duration;
use twitstream::{
    ClientConfig, DeleteRulesRequest, HttpExecutor, Network, RequestOptions, RuleBuilder,
    StreamError, StreamMessage, StreamQuery, TokenGenerator, TwitterApi,
};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RULES_PATH: &str = "/2/tweets/search/stream/rules";
const STREAM_PATH: &str = "/2/tweets/search/stream";

fn executor(server: &MockServer, token: &str) -> HttpExecutor {
    HttpExecutor::with_config(token, ClientConfig::with_base_url(&server.uri()))
}

fn api(server: &MockServer) -> TwitterApi {
    TwitterApi::with_config("test-token", ClientConfig::with_base_url(&server.uri())).unwrap()
}

#[tokio::test]
async fn rate_limited_request_is_retried_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let mut opts = RequestOptions::get(format!("{}/limited", server.uri()));
    let response = executor(&server, "").execute(&mut opts).await.unwrap();

    assert_eq!(opts.retries, 1);
    assert_eq!(response.status, 200);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn retry_cap_surfaces_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let config = ClientConfig {
        max_retries: Some(1),
        ..ClientConfig::with_base_url(&server.uri())
    };
    let mut opts = RequestOptions::get(format!("{}/limited", server.uri()));
    let err = HttpExecutor::with_config("", config)
        .execute(&mut opts)
        .await
        .unwrap_err();

    assert!(matches!(err, StreamError::RateLimited { retries: 1 }));
}

#[tokio::test]
async fn client_error_carries_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/denied"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let mut opts = RequestOptions::get(format!("{}/denied", server.uri()));
    let err = executor(&server, "bad").execute(&mut opts).await.unwrap_err();

    match err {
        StreamError::Network { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "Unauthorized");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(opts.retries, 0);
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let mut opts = RequestOptions::get("http://127.0.0.1:9/unreachable");
    let err = HttpExecutor::new("").execute(&mut opts).await.unwrap_err();
    assert!(matches!(err, StreamError::Transport(_)));
}

#[tokio::test]
async fn bearer_and_content_type_headers_are_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/whoami"))
        .and(header("authorization", "Bearer abc"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut opts = RequestOptions::get(format!("{}/whoami", server.uri()));
    let response = executor(&server, "abc").execute(&mut opts).await.unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn rules_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(RULES_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"value": "cats has:images", "tag": "cat pictures", "id": "1273026480692322304"}],
            "meta": {"sent": "2020-06-16T22:55:39.356Z"}
        })))
        .mount(&server)
        .await;

    let api = api(&server);
    let response = api.rules.get().await.unwrap();

    assert_eq!(response.data.len(), 1);
    assert_eq!(response.data[0].id, "1273026480692322304");
    assert_eq!(response.data[0].tag, "cat pictures");
    assert!(response.errors.is_empty());
}

#[tokio::test]
async fn create_rules_dry_run() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RULES_PATH))
        .and(query_param("dry_run", "true"))
        .and(body_string(r#"{"add":[{"value":"cats","tag":"cat tweets"}]}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{"value": "cats", "tag": "cat tweets", "id": "42"}],
            "meta": {"sent": "now", "summary": {"created": 1, "not_created": 0, "valid": 1, "invalid": 0}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = RuleBuilder::new().add_rule("cats", "cat tweets").build();
    let response = api(&server).rules.create(&request, true).await.unwrap();

    assert_eq!(response.meta.summary.created, 1);
    assert_eq!(response.data[0].id, "42");
}

#[tokio::test]
async fn delete_rules_posts_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RULES_PATH))
        .and(body_string(r#"{"delete":{"ids":["42"]}}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "meta": {"sent": "now", "summary": {"deleted": 1, "not_deleted": 0}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = api(&server)
        .rules
        .delete(&DeleteRulesRequest::new(["42"]), false)
        .await
        .unwrap();

    assert_eq!(response.meta.summary.deleted, 1);
}

#[tokio::test]
async fn token_request_uses_basic_auth() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("authorization", "Basic a2V5OnNlY3JldA=="))
        .and(header(
            "content-type",
            "application/x-www-form-urlencoded;charset=UTF-8",
        ))
        .and(body_string("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token_type": "bearer",
            "access_token": "AAAA"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token =
        TokenGenerator::with_config("key", "secret", ClientConfig::with_base_url(&server.uri()))
            .request_bearer_token()
            .await
            .unwrap();

    assert_eq!(token.token_type, "bearer");
    assert_eq!(token.access_token, "AAAA");
}

#[tokio::test]
async fn stream_delivers_single_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STREAM_PATH))
        .and(query_param("expansions", "author_id"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&server)
        .await;

    let mut api = api(&server);
    let messages = api.stream.messages();
    api.stream
        .start(&StreamQuery::new().add_expansion("author_id"))
        .await
        .unwrap();

    let first = tokio::time::timeout(Duration::from_secs(5), messages.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&first.into_result().unwrap()[..], b"hello");

    let last = tokio::time::timeout(Duration::from_secs(5), messages.next())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(last, StreamMessage::Error(StreamError::EndOfStream)));

    api.stream.join().await;
}

#[tokio::test]
async fn stream_start_failure_is_returned() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(STREAM_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let mut api = api(&server);
    let err = api.stream.start(&StreamQuery::new()).await.unwrap_err();
    assert!(err.is_access_denied());
    assert!(api.stream.messages().is_empty());
}
