//! # Quiz Solver Provider - Gemini
//!
//! Google Gemini provider over the REST `generateContent` endpoint.

mod client;
mod provider;
mod types;

pub use client::{DEFAULT_BASE_URL, GeminiClient};
pub use provider::GeminiProvider;
pub use types::*;
