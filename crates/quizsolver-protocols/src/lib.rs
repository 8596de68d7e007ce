//! # Quiz Solver Protocols
//!
//! Shared data types and the trait seams between the orchestrator and its
//! collaborators. Contains only interface definitions - no implementations.
//!
//! ## Core Traits
//!
//! - [`LLMProvider`] - Generates text (solution code) from a prompt
//! - [`PageRenderer`] - Renders a quiz page and extracts its question
//! - [`CodeRunner`] - Executes generated solution code
//! - [`AnswerSubmitter`] - Posts fallback answers to the quiz server

pub mod error;
pub mod llm;
pub mod quiz;
pub mod types;

pub use error::{BrowserError, ExecutorError, ProviderError, SolverError};
pub use llm::{Generation, GenerationRequest, LLMProvider, StopReason, TokenCount};
pub use quiz::{AnswerSubmitter, CodeRunner, PageRenderer};
pub use types::*;
