//! Test state with a handler whose collaborators never leave the process.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quizsolver_config::Config;
use quizsolver_protocols::{
    AnswerSubmitter, BrowserError, CodeRunner, ExecutionResult, Generation, GenerationRequest,
    LLMProvider, PageRenderer, ProviderError, QuestionData, SubmissionResult,
};
use quizsolver_runtime::{LlmSolver, QuizHandler, QuizSettings, SolverSettings};

use crate::state::AppState;

/// Records visited URLs and fails, which ends the chain at once.
#[derive(Default)]
pub struct RecordingRenderer {
    pub visits: Mutex<Vec<String>>,
}

#[async_trait]
impl PageRenderer for RecordingRenderer {
    async fn visit_quiz_page(&self, url: &str) -> Result<QuestionData, BrowserError> {
        self.visits.lock().unwrap().push(url.to_string());
        Err(BrowserError::NotConnected)
    }
}

struct OfflineProvider;

#[async_trait]
impl LLMProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate(&self, _request: GenerationRequest) -> Result<Generation, ProviderError> {
        Err(ProviderError::Network("offline".to_string()))
    }
}

struct IdleRunner;

#[async_trait]
impl CodeRunner for IdleRunner {
    async fn execute_code(&self, _code: &str, _quiz_url: &str) -> ExecutionResult {
        ExecutionResult::failed("not available")
    }
}

struct IdleSubmitter;

#[async_trait]
impl AnswerSubmitter for IdleSubmitter {
    async fn submit_fallback(&self, _quiz_url: &str) -> Option<SubmissionResult> {
        None
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.student.email = "student@example.com".to_string();
    config.student.secret = "s3cret".to_string();
    config.server.body_limit = 1024;
    config
}

pub fn test_state() -> (Arc<AppState>, Arc<RecordingRenderer>) {
    let config = test_config();
    let renderer = Arc::new(RecordingRenderer::default());
    let solver = Arc::new(LlmSolver::new(
        Arc::new(OfflineProvider),
        SolverSettings::from_config(&config),
    ));
    let handler = Arc::new(QuizHandler::new(
        renderer.clone(),
        solver,
        Arc::new(IdleRunner),
        Arc::new(IdleSubmitter),
        QuizSettings::from(&config.quiz),
    ));
    (Arc::new(AppState::new(Arc::new(config), handler)), renderer)
}
