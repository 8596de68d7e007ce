//! HTTP route definitions.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, liveness, service_info, submit_quiz};
use crate::state::AppState;

/// Build the router.
///
/// ```text
/// POST /        - Submit quiz task (solved in background)
/// GET  /        - Service information
/// GET  /health  - Health check
/// GET  /livez   - Liveness probe
/// ```
///
/// Oversized bodies surface as a `BytesRejection` in [`submit_quiz`], so the
/// 413 carries the usual `{"detail": ...}` body.
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.body_limit;

    Router::new()
        .route("/", get(service_info).post(submit_quiz))
        .route("/health", get(health))
        .route("/livez", get(liveness))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
