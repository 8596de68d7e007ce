//! HTTP transport for the Gemini REST API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::debug;

use quizsolver_protocols::error::ProviderError;

use crate::types::{ErrorBody, GenerateContentRequest, GenerateContentResponse};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Long enough for a large model to write a full script.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        Self::with_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_url(api_key: String, base_url: String) -> Result<Self, ProviderError> {
        Self::with_timeout(api_key, base_url, REQUEST_TIMEOUT)
    }

    /// Fails only when the TLS backend cannot be initialised.
    pub fn with_timeout(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Network(format!("http client: {}", e)))?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `models/{model}:generateContent`.
    pub async fn generate_content(
        &self,
        model: &str,
        body: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        debug!(%url, "Gemini request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.timeout))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| transport_error(e, self.timeout))?;
        if !status.is_success() {
            return Err(api_error(status, text));
        }

        serde_json::from_str(&text).map_err(|e| ProviderError::ApiError {
            status: 500,
            message: format!("Failed to parse response: {}", e),
        })
    }
}

/// Prefer the structured `error.message`, else the raw body.
fn api_error(status: StatusCode, body: String) -> ProviderError {
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error.message)
        .unwrap_or(body);
    ProviderError::from_api_response(status.as_u16(), message)
}

fn transport_error(e: reqwest::Error, timeout: Duration) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout.as_secs())
    } else {
        ProviderError::Network(e.to_string())
    }
}
