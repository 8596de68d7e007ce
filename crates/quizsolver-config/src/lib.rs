//! # Quiz Solver Config
//!
//! Configuration for the quiz solver: a TOML file (optional) overlaid with
//! environment variables, the way container deployments configure it.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, Finding, ValidationResult};
