//! Application state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use quizsolver_config::Config;
use quizsolver_runtime::QuizHandler;

/// State shared across handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub handler: Arc<QuizHandler>,
    accepted: AtomicU64,
}

impl AppState {
    pub fn new(config: Arc<Config>, handler: Arc<QuizHandler>) -> Self {
        Self {
            config,
            handler,
            accepted: AtomicU64::new(0),
        }
    }

    /// Number of quiz tasks accepted since startup.
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    pub(crate) fn record_accepted(&self) -> u64 {
        self.accepted.fetch_add(1, Ordering::Relaxed) + 1
    }
}
