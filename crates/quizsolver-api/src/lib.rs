//! # Quiz Solver API
//!
//! HTTP front end for the quiz solver. `POST /` validates the student's
//! secret, answers immediately and solves the quiz chain on a background
//! task.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

#[cfg(test)]
mod test_support;

pub use error::ApiError;
pub use routes::create_router;
pub use server::{ApiServer, shutdown_signal};
pub use state::AppState;
