//! # Quiz Solver Runtime
//!
//! Turns a quiz URL into answers: renders each page, asks the LLM for a
//! solution script, runs it, and follows the chain of quiz URLs the server
//! hands back, all within a per-question time budget.

pub mod handler;
pub mod prompt;
pub mod retry;
pub mod solver;
pub mod submitter;

#[cfg(test)]
mod test_support;

pub use handler::{QuizHandler, QuizSettings};
pub use retry::{RetryConfig, RetryProvider};
pub use solver::{LlmSolver, SolverSettings, clean_code};
pub use submitter::HttpAnswerSubmitter;
