//! LLM-backed solution generation.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{info, warn};

use quizsolver_config::Config;
use quizsolver_protocols::{
    AttemptFeedback, GenerationRequest, LLMProvider, QuestionData, SolverError,
};

use crate::prompt;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```python\s*\n").expect("valid regex"));
static BARE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```\s*\n").expect("valid regex"));
static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n```\s*$").expect("valid regex"));

/// Model and credential settings for the solver.
#[derive(Debug, Clone)]
pub struct SolverSettings {
    pub model: String,
    pub temperature: f32,
    pub student_email: String,
    pub student_secret: String,
}

impl SolverSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.gemini.model.clone(),
            temperature: config.gemini.temperature,
            student_email: config.student.email.clone(),
            student_secret: config.student.secret.clone(),
        }
    }
}

/// Generates Python solution scripts with an LLM.
pub struct LlmSolver {
    provider: Arc<dyn LLMProvider>,
    settings: SolverSettings,
    system_prompt: String,
}

impl LlmSolver {
    pub fn new(provider: Arc<dyn LLMProvider>, settings: SolverSettings) -> Self {
        let system_prompt =
            prompt::system_prompt(&settings.student_email, &settings.student_secret);
        info!(model = %settings.model, provider = provider.name(), "LLM solver initialized");
        Self {
            provider,
            settings,
            system_prompt,
        }
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn build_prompt(&self, question: &QuestionData, feedback: Option<&AttemptFeedback>) -> String {
        prompt::solution_prompt(
            question,
            &self.settings.student_email,
            &self.settings.student_secret,
            feedback,
        )
    }

    /// Ask for a solution script, with feedback from a failed attempt if any.
    pub async fn generate_solution(
        &self,
        question: &QuestionData,
        feedback: Option<&AttemptFeedback>,
    ) -> Result<String, SolverError> {
        info!(
            question_len = question.question_text.len(),
            retry = feedback.is_some(),
            "Generating solution code"
        );

        let request = GenerationRequest::new(&self.settings.model, self.build_prompt(question, feedback))
            .system(&self.system_prompt)
            .temperature(self.settings.temperature);

        self.request_code(request).await
    }

    /// Ask for a corrected version of code that crashed.
    pub async fn analyze_error_and_retry(
        &self,
        question: &QuestionData,
        code: &str,
        error: &str,
    ) -> Result<String, SolverError> {
        info!("Analyzing error and generating fix");

        let request =
            GenerationRequest::new(&self.settings.model, prompt::fix_prompt(question, code, error))
                .system(&self.system_prompt);

        self.request_code(request).await
    }

    async fn request_code(&self, request: GenerationRequest) -> Result<String, SolverError> {
        let generation = self.provider.generate(request).await.inspect_err(|e| {
            warn!("LLM request failed: {}", e);
        })?;

        if generation.is_truncated() {
            warn!("LLM response was truncated at the token limit");
        }
        info!(
            tokens = generation.tokens.total(),
            "Received response - {} characters",
            generation.text.len()
        );

        clean_code(&generation.text)
    }
}

/// Strip markdown code fences from a model reply.
pub fn clean_code(text: &str) -> Result<String, SolverError> {
    let code = OPENING_FENCE.replace_all(text, "");
    let code = BARE_FENCE.replace_all(&code, "");
    let code = TRAILING_FENCE.replace(&code, "");
    let code = code.trim();

    if code.is_empty() {
        return Err(SolverError::EmptyCode);
    }
    Ok(code.to_string())
}

#[cfg(test)]
#[path = "solver_tests.rs"]
mod tests;
