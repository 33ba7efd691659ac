#![allow(dead_code)]

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flipscan_core::{GenerativeConfig, Listing};
use flipscan_engine::GenerativeClient;

/// Address nothing listens on; connections are refused immediately.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

pub fn config_for(base_url: &str, timeout_secs: u64) -> GenerativeConfig {
    GenerativeConfig {
        base_url: base_url.to_string(),
        model: "mistral".to_string(),
        temperature: 0.7,
        timeout_secs,
    }
}

pub fn client_for(base_url: &str) -> GenerativeClient {
    GenerativeClient::new(&config_for(base_url, 5)).expect("client construction should not fail")
}

pub fn listing(identifier: &str, title: &str, source: &str, price: f64) -> Listing {
    Listing {
        identifier: identifier.to_string(),
        title: title.to_string(),
        source_name: source.to_string(),
        price,
        original_price: price,
        url: format!("https://{source}.example/{identifier}"),
        image_url: String::new(),
        stock_status: "In Stock".to_string(),
        observed_at: Utc::now(),
    }
}

/// Mounts a generate endpoint answering every request with `text`.
pub async fn mount_generated_text(server: &MockServer, text: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "mistral",
            "response": text,
            "done": true
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mounts a generate endpoint answering every request with `status`.
pub async fn mount_status(server: &MockServer, status: u16, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(server)
        .await;
}
