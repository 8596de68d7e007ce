//! Error types for the quiz solver protocol layer.

mod browser;
mod executor;
mod provider;
mod solver;

pub use browser::*;
pub use executor::*;
pub use provider::*;
pub use solver::*;
