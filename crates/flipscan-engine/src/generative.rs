//! HTTP client for the text-generation service (`POST {base}/api/generate`).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use flipscan_core::GenerativeConfig;

use crate::error::EngineError;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Single-shot client: one request per call, no retries.
#[derive(Debug, Clone)]
pub struct GenerativeClient {
    client: Client,
    url: String,
    model: String,
    temperature: f32,
}

impl GenerativeClient {
    /// Creates a client with the configured per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &GenerativeConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/api/generate", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// Sends `prompt` and returns the generated text.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Unreachable`] on connection failure or timeout.
    /// - [`EngineError::Status`] for any non-2xx response.
    /// - [`EngineError::Http`] for other transport failures.
    /// - [`EngineError::Deserialize`] if the body lacks the generated-text field.
    pub async fn generate(&self, prompt: &str) -> Result<String, EngineError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(classify_transport_error)?;
        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| EngineError::Deserialize {
                context: format!("POST {}", self.url),
                source: e,
            })?;

        Ok(parsed.response)
    }
}

fn classify_transport_error(err: reqwest::Error) -> EngineError {
    if err.is_connect() || err.is_timeout() {
        EngineError::Unreachable(err)
    } else {
        EngineError::Http(err)
    }
}
