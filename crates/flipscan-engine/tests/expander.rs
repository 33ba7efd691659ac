//! Integration tests for `QueryExpander` against a mocked generate endpoint.

mod common;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flipscan_engine::{GenerativeClient, QueryExpander};

use common::{client_for, config_for, mount_generated_text, mount_status, UNREACHABLE_URL};

#[tokio::test]
async fn expand_prepends_original_query_to_suggestions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "model": "mistral", "stream": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "[\"televisions\", \"smart phones\", \"laptops\"]"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let expander = QueryExpander::new(client_for(&server.uri()));
    let result = expander.expand("electronics").await;

    assert_eq!(
        result.terms(),
        ["electronics", "televisions", "smart phones", "laptops"].map(String::from)
    );
}

#[tokio::test]
async fn expand_accepts_more_terms_than_requested() {
    let server = MockServer::start().await;
    mount_generated_text(
        &server,
        "[\"a\", \"b\", \"c\", \"d\", \"e\", \"f\", \"g\", \"h\", \"i\"]",
        1,
    )
    .await;

    let expander = QueryExpander::new(client_for(&server.uri()));
    let result = expander.expand("misc").await;

    assert_eq!(result.len(), 10);
    assert_eq!(result.original(), "misc");
}

#[tokio::test]
async fn expand_returns_only_query_on_server_error() {
    let server = MockServer::start().await;
    mount_status(&server, 500, 1).await;

    let expander = QueryExpander::new(client_for(&server.uri()));
    let result = expander.expand("yoga mat").await;

    assert_eq!(result.terms(), ["yoga mat".to_string()]);
}

#[tokio::test]
async fn expand_returns_only_query_when_text_is_not_json() {
    let server = MockServer::start().await;
    mount_generated_text(&server, "Sure! Try televisions, phones, or laptops.", 1).await;

    let expander = QueryExpander::new(client_for(&server.uri()));
    let result = expander.expand("electronics").await;

    assert_eq!(result.terms(), ["electronics".to_string()]);
}

#[tokio::test]
async fn expand_returns_only_query_when_text_is_not_an_array() {
    let server = MockServer::start().await;
    mount_generated_text(&server, "{\"terms\": [\"laptops\"]}", 1).await;

    let expander = QueryExpander::new(client_for(&server.uri()));
    let result = expander.expand("electronics").await;

    assert_eq!(result.terms(), ["electronics".to_string()]);
}

#[tokio::test]
async fn expand_returns_only_query_when_body_lacks_generated_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "done": true })))
        .expect(1)
        .mount(&server)
        .await;

    let expander = QueryExpander::new(client_for(&server.uri()));
    let result = expander.expand("electronics").await;

    assert_eq!(result.terms(), ["electronics".to_string()]);
}

#[tokio::test]
async fn expand_returns_only_query_when_service_unreachable() {
    let expander = QueryExpander::new(client_for(UNREACHABLE_URL));
    let result = expander.expand("desk lamp").await;

    assert_eq!(result.terms(), ["desk lamp".to_string()]);
}

#[tokio::test]
async fn expand_returns_only_query_on_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "response": "[\"late\"]" }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = GenerativeClient::new(&config_for(&server.uri(), 1))
        .expect("client construction should not fail");
    let expander = QueryExpander::new(client);
    let result = expander.expand("slow query").await;

    assert_eq!(result.terms(), ["slow query".to_string()]);
}
