//! Text generation seam used by the solver.
//!
//! The solver only ever sends one prompt plus a system instruction, so a
//! request carries a single prompt instead of a conversation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// One generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    /// Provider default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_instruction: None,
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_output_tokens(mut self, limit: u32) -> Self {
        self.max_output_tokens = Some(limit);
        self
    }
}

/// Why generation ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    #[default]
    Complete,
    /// Hit the output token limit; the text is likely cut mid-script.
    Truncated,
    Blocked,
    Other,
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCount {
    pub prompt: u32,
    pub output: u32,
}

impl TokenCount {
    pub fn total(&self) -> u32 {
        self.prompt.saturating_add(self.output)
    }
}

/// Generated text and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub model: String,
    pub text: String,
    #[serde(default)]
    pub stop: StopReason,
    #[serde(default)]
    pub tokens: TokenCount,
}

impl Generation {
    /// A complete generation without token accounting.
    pub fn complete(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: text.into(),
            stop: StopReason::Complete,
            tokens: TokenCount::default(),
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.stop == StopReason::Truncated
    }
}

/// A text generation backend.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    async fn generate(&self, request: GenerationRequest) -> Result<Generation, ProviderError>;
}

#[cfg(test)]
#[path = "llm_tests.rs"]
mod tests;
