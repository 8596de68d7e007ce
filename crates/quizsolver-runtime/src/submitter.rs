//! Fallback answer submission over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{error, warn};

use quizsolver_protocols::{AnswerSubmitter, SubmissionResult};

const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts a placeholder answer straight to the quiz URL so the chain can
/// move on even when no solution ran.
pub struct HttpAnswerSubmitter {
    http: reqwest::Client,
    email: String,
    secret: String,
    answer: String,
}

impl HttpAnswerSubmitter {
    pub fn new(
        email: impl Into<String>,
        secret: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        Self::with_timeout(email, secret, answer, SUBMIT_TIMEOUT)
    }

    pub fn with_timeout(
        email: impl Into<String>,
        secret: impl Into<String>,
        answer: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            email: email.into(),
            secret: secret.into(),
            answer: answer.into(),
        })
    }

    fn payload(&self, quiz_url: &str) -> Value {
        json!({
            "email": self.email,
            "secret": self.secret,
            "url": quiz_url,
            "answer": self.answer,
        })
    }
}

#[async_trait]
impl AnswerSubmitter for HttpAnswerSubmitter {
    async fn submit_fallback(&self, quiz_url: &str) -> Option<SubmissionResult> {
        warn!(url = quiz_url, "Sending fallback submission");

        let response = match self.http.post(quiz_url).json(&self.payload(quiz_url)).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Fallback submission failed: {}", e);
                return None;
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to read fallback response: {}", e);
                return None;
            }
        };
        warn!(status, response = %body, "Fallback response");

        let Ok(Value::Object(data)) = serde_json::from_str::<Value>(&body) else {
            warn!("Fallback response is not a JSON object");
            return None;
        };

        Some(SubmissionResult {
            correct: data.get("correct").and_then(Value::as_bool),
            next_url: data
                .get("url")
                .and_then(Value::as_str)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            reason: data.get("reason").and_then(Value::as_str).map(str::to_string),
            status_code: Some(status),
        })
    }
}

#[cfg(test)]
#[path = "submitter_tests.rs"]
mod tests;
