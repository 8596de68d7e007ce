//! Quiz task, page and result types.

use serde::{Deserialize, Serialize};

/// Incoming quiz task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRequest {
    pub email: String,
    pub secret: String,
    pub url: String,
}

/// Immediate acknowledgement for an accepted quiz task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAccepted {
    pub status: String,
    pub message: String,
    pub email: String,
    pub url: String,
}

impl QuizAccepted {
    pub fn new(email: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            status: "accepted".to_string(),
            message: "Quiz solving process initiated".to_string(),
            email: email.into(),
            url: url.into(),
        }
    }
}

/// A rendered quiz page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionData {
    /// Visible text of the page.
    pub question_text: String,
    /// Full HTML after scripts ran.
    pub raw_html: String,
    /// URL the page was loaded from.
    pub url: String,
}

/// Verdict parsed from the output of a solution run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub correct: Option<bool>,
    pub next_url: Option<String>,
    pub reason: Option<String>,
    pub status_code: Option<u16>,
}

impl SubmissionResult {
    /// True when nothing at all could be parsed.
    pub fn is_empty(&self) -> bool {
        self.correct.is_none()
            && self.next_url.is_none()
            && self.reason.is_none()
            && self.status_code.is_none()
    }
}

/// Outcome of running generated code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    /// Captured stdout, empty when the program printed nothing.
    pub output: String,
    /// Short error description (`Type: message`) on failure.
    pub error: Option<String>,
    /// Full stderr on failure.
    pub traceback: Option<String>,
    pub submission: SubmissionResult,
}

impl ExecutionResult {
    /// A failed run that never produced output.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Final status of one quiz in a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    Correct,
    Incorrect,
    Skipped,
    Error,
}

/// Status plus the link to the following quiz, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOutcome {
    pub status: QuizStatus,
    pub next_url: Option<String>,
}

impl QuizOutcome {
    pub fn new(status: QuizStatus, next_url: Option<String>) -> Self {
        Self { status, next_url }
    }

    /// Error with no way forward.
    pub fn error() -> Self {
        Self::new(QuizStatus::Error, None)
    }
}

/// Counters for a whole quiz chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceStats {
    pub total: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
    pub errors: u32,
}

impl SequenceStats {
    pub fn record(&mut self, status: QuizStatus) {
        self.total += 1;
        match status {
            QuizStatus::Correct => self.correct += 1,
            QuizStatus::Incorrect => self.incorrect += 1,
            QuizStatus::Skipped => self.skipped += 1,
            QuizStatus::Error => self.errors += 1,
        }
    }
}

/// Context from a failed attempt, fed back into the next prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptFeedback {
    pub error: String,
    pub failed_code: String,
    pub previous_output: String,
}

#[cfg(test)]
#[path = "quiz_tests.rs"]
mod tests;
