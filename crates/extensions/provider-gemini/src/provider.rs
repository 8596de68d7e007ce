//! [`LLMProvider`] backed by Gemini.

use async_trait::async_trait;
use tracing::{debug, warn};

use quizsolver_protocols::error::ProviderError;
use quizsolver_protocols::{Generation, GenerationRequest, LLMProvider, StopReason, TokenCount};

use crate::client::GeminiClient;
use crate::types::{
    GenerateContentRequest, GenerateContentResponse, GenerationConfig, SafetySetting, TextContent,
};

pub struct GeminiProvider {
    client: GeminiClient,
    safety_settings: Vec<SafetySetting>,
}

impl GeminiProvider {
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        GeminiClient::new(api_key).map(Self::from_client)
    }

    /// Provider against a custom endpoint, e.g. a proxy or a test server.
    pub fn with_url(api_key: String, base_url: String) -> Result<Self, ProviderError> {
        GeminiClient::with_url(api_key, base_url).map(Self::from_client)
    }

    pub fn from_client(client: GeminiClient) -> Self {
        Self {
            client,
            safety_settings: SafetySetting::permissive(),
        }
    }

    pub fn with_safety_settings(mut self, settings: Vec<SafetySetting>) -> Self {
        self.safety_settings = settings;
        self
    }

    fn wire_request<'a>(&'a self, request: &'a GenerationRequest) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: [TextContent::user(&request.prompt)],
            system_instruction: request.system_instruction.as_deref().map(TextContent::instruction),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                candidate_count: 1,
                max_output_tokens: request.max_output_tokens,
            },
            safety_settings: &self.safety_settings,
        }
    }
}

/// Map a Gemini `finishReason`. A missing reason means the stream ended normally.
pub(crate) fn stop_reason(reason: Option<&str>) -> StopReason {
    match reason {
        None | Some("STOP") => StopReason::Complete,
        Some("MAX_TOKENS") => StopReason::Truncated,
        Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII") => {
            StopReason::Blocked
        }
        Some(_) => StopReason::Other,
    }
}

/// Take the first candidate. A blocked prompt or a candidate without text
/// is an error; a truncated one is returned with a warning.
pub(crate) fn into_generation(
    response: GenerateContentResponse,
    model: &str,
) -> Result<Generation, ProviderError> {
    let GenerateContentResponse {
        candidates,
        prompt_feedback,
        usage_metadata,
    } = response;

    let Some(candidate) = candidates.into_iter().next() else {
        let reason = prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(ProviderError::ContentFiltered(reason));
    };

    let stop = stop_reason(candidate.finish_reason.as_deref());
    let text = candidate.content.map(|c| c.text()).unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::ContentFiltered(
            candidate
                .finish_reason
                .unwrap_or_else(|| "candidate has no text".to_string()),
        ));
    }
    if stop == StopReason::Truncated {
        warn!(model, "Gemini output hit the token limit");
    }

    let usage = usage_metadata.unwrap_or_default();
    Ok(Generation {
        model: model.to_string(),
        text,
        stop,
        tokens: TokenCount {
            prompt: usage.prompt_token_count,
            output: usage.candidates_token_count,
        },
    })
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Generation, ProviderError> {
        debug!(model = %request.model, prompt_len = request.prompt.len(), "Gemini generate");

        let response = self
            .client
            .generate_content(&request.model, &self.wire_request(&request))
            .await?;
        into_generation(response, &request.model)
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
