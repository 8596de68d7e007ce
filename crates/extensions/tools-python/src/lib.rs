//! Python execution for generated quiz solutions.
//!
//! This extension provides:
//! - [`PythonExecutor`]: runs solution code in a `python3` subprocess
//! - [`parse_submission_result`]: recovers the quiz server verdict from stdout
//! - [`python_literal`]: parser for Python dict/list literals

mod executor;
mod parser;
pub mod python_literal;

pub use executor::{PythonExecutor, PythonExecutorConfig};
pub use parser::parse_submission_result;
