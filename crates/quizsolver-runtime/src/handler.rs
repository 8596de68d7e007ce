//! Quiz chain orchestration.
//!
//! Each question gets its own time budget. Retries happen only while more
//! than twice the skip threshold remains; otherwise a placeholder answer is
//! submitted so the server hands out the next URL.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{error, info, warn};

use quizsolver_config::QuizConfig;
use quizsolver_protocols::{
    AnswerSubmitter, AttemptFeedback, CodeRunner, ExecutionResult, PageRenderer, QuestionData,
    QuizOutcome, QuizStatus, SequenceStats,
};

use crate::solver::LlmSolver;

/// Time budget and retry policy.
#[derive(Debug, Clone)]
pub struct QuizSettings {
    /// Budget per question, reset when the chain moves on.
    pub timeout: Duration,
    /// Below this much remaining time no retry starts.
    pub skip_threshold: Duration,
    /// Retry rounds allowed per question.
    pub max_retries: u32,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(180),
            skip_threshold: Duration::from_secs(15),
            max_retries: 1,
        }
    }
}

impl From<&QuizConfig> for QuizSettings {
    fn from(config: &QuizConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_seconds),
            skip_threshold: Duration::from_secs(config.skip_threshold_seconds),
            max_retries: config.max_retries_per_question,
        }
    }
}

/// Drives a quiz chain from the first URL to the last.
pub struct QuizHandler {
    renderer: Arc<dyn PageRenderer>,
    solver: Arc<LlmSolver>,
    runner: Arc<dyn CodeRunner>,
    submitter: Arc<dyn AnswerSubmitter>,
    settings: QuizSettings,
}

impl QuizHandler {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        solver: Arc<LlmSolver>,
        runner: Arc<dyn CodeRunner>,
        submitter: Arc<dyn AnswerSubmitter>,
        settings: QuizSettings,
    ) -> Self {
        Self {
            renderer,
            solver,
            runner,
            submitter,
            settings,
        }
    }

    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// Time left in the budget that started at `start`.
    pub fn remaining(&self, start: Instant) -> Duration {
        self.settings.timeout.saturating_sub(start.elapsed())
    }

    /// Whether enough time remains to start a retry.
    pub fn can_retry(&self, start: Instant) -> bool {
        self.settings.max_retries > 0 && self.remaining(start) > self.settings.skip_threshold * 2
    }

    /// Solve quizzes starting at `initial_url`, following `next_url` links
    /// until the server stops handing them out.
    pub async fn solve_quiz_sequence(&self, initial_url: &str, sequence_start: Instant) -> SequenceStats {
        info!(
            url = initial_url,
            timeout_secs = self.settings.timeout.as_secs(),
            "Starting quiz sequence"
        );

        let mut stats = SequenceStats::default();
        let mut current_url = initial_url.to_string();
        let mut quiz_number = 1u32;

        loop {
            let question_start = Instant::now();
            info!(
                quiz = quiz_number,
                url = %current_url,
                elapsed = %format!("{:.1}s", sequence_start.elapsed().as_secs_f64()),
                "Solving quiz"
            );

            let outcome = self.solve_single_quiz(&current_url, question_start).await;
            stats.record(outcome.status);
            info!(
                quiz = quiz_number,
                status = ?outcome.status,
                took = %format!("{:.1}s", question_start.elapsed().as_secs_f64()),
                "Quiz finished"
            );

            match outcome.next_url {
                Some(next) => {
                    info!(next = %next, "Moving to next quiz");
                    current_url = next;
                    quiz_number += 1;
                }
                None => {
                    info!("No next URL, quiz sequence completed");
                    break;
                }
            }
        }

        info!(
            total = stats.total,
            correct = stats.correct,
            incorrect = stats.incorrect,
            skipped = stats.skipped,
            errors = stats.errors,
            elapsed = %format!("{:.1}s", sequence_start.elapsed().as_secs_f64()),
            "Quiz sequence ended"
        );
        stats
    }

    /// Solve one quiz page within the budget that started at `start`.
    pub async fn solve_single_quiz(&self, url: &str, start: Instant) -> QuizOutcome {
        let question = match self.renderer.visit_quiz_page(url).await {
            Ok(question) => question,
            Err(e) => {
                error!(url, "Failed to render quiz page: {}", e);
                return QuizOutcome::error();
            }
        };
        info!("Question extracted");

        let code = match self.solver.generate_solution(&question, None).await {
            Ok(code) => code,
            Err(e) => {
                error!("LLM failed to generate code: {}", e);
                if !self.can_retry(start) {
                    warn!("Not enough time for retry");
                    return self.fallback(url).await;
                }
                info!("Regenerating solution");
                match self.solver.generate_solution(&question, None).await {
                    Ok(code) => code,
                    Err(e) => {
                        error!("Retry also failed to generate code: {}", e);
                        return QuizOutcome::error();
                    }
                }
            }
        };
        info!("Solution generated");

        let result = self.runner.execute_code(&code, url).await;
        if !result.success {
            let error = result.error.clone().unwrap_or_default();
            error!("Execution failed: {}", error);
            if self.can_retry(start) {
                return self.retry_with_fix(&question, url, &code, &error, start).await;
            }
            warn!("Not enough time for retry");
            return self.fallback(url).await;
        }
        info!("Code executed successfully");

        let submission = &result.submission;
        if submission.is_empty() {
            warn!("No submission result in output");
            return self.fallback(url).await;
        }

        match submission.correct {
            Some(true) => {
                info!("Answer was correct");
                QuizOutcome::new(QuizStatus::Correct, submission.next_url.clone())
            }
            Some(false) => {
                let reason = submission
                    .reason
                    .clone()
                    .unwrap_or_else(|| "No reason provided".to_string());
                warn!(reason = %reason, "Answer was incorrect");
                let next_url = submission.next_url.clone();

                if self.can_retry(start) {
                    info!("Enough time remaining, retrying");
                    let mut retried = self
                        .retry_with_feedback(&question, url, &reason, &code, &result.output, start)
                        .await;
                    if retried.next_url.is_none() {
                        retried.next_url = next_url;
                    }
                    retried
                } else if next_url.is_some() {
                    warn!(
                        remaining = %format!("{:.1}s", self.remaining(start).as_secs_f64()),
                        "Skipping to next URL"
                    );
                    QuizOutcome::new(QuizStatus::Skipped, next_url)
                } else {
                    warn!("No time to retry and no next URL");
                    QuizOutcome::new(QuizStatus::Incorrect, None)
                }
            }
            None => {
                warn!("Could not determine submission result");
                QuizOutcome::error()
            }
        }
    }

    /// Ask for fixed code after a crash and run it.
    pub async fn retry_with_fix(
        &self,
        question: &QuestionData,
        url: &str,
        failed_code: &str,
        error: &str,
        start: Instant,
    ) -> QuizOutcome {
        let mut code = failed_code.to_string();
        let mut error = error.to_string();

        for round in 1..=self.settings.max_retries {
            if self.remaining(start) < self.settings.skip_threshold {
                return QuizOutcome::error();
            }
            info!(round, "Retrying after execution error");

            let fixed = match self.solver.analyze_error_and_retry(question, &code, &error).await {
                Ok(fixed) => fixed,
                Err(e) => {
                    error!("Failed to generate fix: {}", e);
                    return QuizOutcome::error();
                }
            };

            let result = self.runner.execute_code(&fixed, url).await;
            if result.success {
                return verdict(&result);
            }

            error = result.error.unwrap_or_default();
            warn!(round, "Fixed code failed again: {}", error);
            code = fixed;
        }

        QuizOutcome::error()
    }

    /// Regenerate with the server's feedback after a wrong answer.
    pub async fn retry_with_feedback(
        &self,
        question: &QuestionData,
        url: &str,
        reason: &str,
        failed_code: &str,
        previous_output: &str,
        start: Instant,
    ) -> QuizOutcome {
        let mut feedback = AttemptFeedback {
            error: reason.to_string(),
            failed_code: failed_code.to_string(),
            previous_output: previous_output.to_string(),
        };
        let mut outcome = QuizOutcome::new(QuizStatus::Incorrect, None);

        for round in 1..=self.settings.max_retries {
            if self.remaining(start) < self.settings.skip_threshold {
                return outcome;
            }
            info!(round, "Retrying after incorrect answer");

            let code = match self.solver.generate_solution(question, Some(&feedback)).await {
                Ok(code) => code,
                Err(e) => {
                    error!("Failed to regenerate solution: {}", e);
                    return QuizOutcome::error();
                }
            };

            let result = self.runner.execute_code(&code, url).await;
            if !result.success || result.submission.is_empty() {
                return QuizOutcome::error();
            }

            outcome = verdict(&result);
            if outcome.status == QuizStatus::Correct {
                return outcome;
            }

            feedback = AttemptFeedback {
                error: result
                    .submission
                    .reason
                    .clone()
                    .unwrap_or_else(|| "No reason provided".to_string()),
                failed_code: code,
                previous_output: result.output,
            };
        }

        outcome
    }

    /// Submit the placeholder answer and follow whatever URL comes back.
    async fn fallback(&self, url: &str) -> QuizOutcome {
        info!("Submitting fallback answer");
        match self.submitter.submit_fallback(url).await {
            Some(submission) => QuizOutcome::new(QuizStatus::Incorrect, submission.next_url),
            None => QuizOutcome::error(),
        }
    }
}

/// Correct when the server said so, incorrect otherwise.
fn verdict(result: &ExecutionResult) -> QuizOutcome {
    let status = if result.submission.correct == Some(true) {
        QuizStatus::Correct
    } else {
        QuizStatus::Incorrect
    };
    QuizOutcome::new(status, result.submission.next_url.clone())
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
