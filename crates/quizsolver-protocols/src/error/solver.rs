//! Solution generation errors.

use thiserror::Error;

use super::ProviderError;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("LLM request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("LLM returned no code")]
    EmptyCode,
}
