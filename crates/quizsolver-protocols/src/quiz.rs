//! Seams between the quiz orchestrator and its collaborators.

use async_trait::async_trait;

use crate::error::BrowserError;
use crate::types::{ExecutionResult, QuestionData, SubmissionResult};

/// Loads a quiz page and extracts the question.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn visit_quiz_page(&self, url: &str) -> Result<QuestionData, BrowserError>;
}

/// Runs generated solution code.
///
/// Never fails: interpreter errors, timeouts and crashes are reported
/// through [`ExecutionResult::success`] and [`ExecutionResult::error`].
#[async_trait]
pub trait CodeRunner: Send + Sync {
    async fn execute_code(&self, code: &str, quiz_url: &str) -> ExecutionResult;
}

/// Posts a placeholder answer when no real answer could be produced.
#[async_trait]
pub trait AnswerSubmitter: Send + Sync {
    /// Returns the parsed server verdict, or `None` if the request failed
    /// or the response was unreadable.
    async fn submit_fallback(&self, quiz_url: &str) -> Option<SubmissionResult>;
}
