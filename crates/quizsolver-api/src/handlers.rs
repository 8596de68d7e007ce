//! HTTP handlers.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use serde_json::{Value, json};
use tokio::time::Instant;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use quizsolver_protocols::{QuizAccepted, QuizRequest};

use crate::error::ApiError;
use crate::state::AppState;

/// Accept a quiz task and solve it in the background.
pub async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<QuizAccepted>, ApiError> {
    let start = Instant::now();
    let request = parse_request(body)?;

    let student = &state.config.student;
    if request.secret != student.secret {
        error!(email = %request.email, "Invalid secret provided");
        return Err(ApiError::InvalidSecret);
    }
    if request.email != student.email {
        warn!(
            received = %request.email,
            expected = %student.email,
            "Email mismatch"
        );
    }

    let accepted = state.record_accepted();
    let task_id = Uuid::new_v4();
    info!(accepted, %task_id, url = %request.url, "Quiz accepted, solving in background");
    spawn_sequence(state.clone(), request.url.clone(), start, task_id);

    Ok(Json(QuizAccepted::new(request.email, request.url)))
}

fn parse_request(body: Result<Bytes, BytesRejection>) -> Result<QuizRequest, ApiError> {
    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(ApiError::PayloadTooLarge);
        }
        Err(rejection) => return Err(ApiError::Internal(rejection.body_text())),
    };

    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        error!("Invalid JSON: {}", e);
        ApiError::InvalidJson
    })?;

    serde_json::from_value(payload).map_err(|e| {
        error!("Validation failed: {}", e);
        ApiError::InvalidPayload
    })
}

/// Every log line of the background run carries the task id.
fn spawn_sequence(state: Arc<AppState>, url: String, start: Instant, task_id: Uuid) {
    let task = tokio::spawn(
        async move {
            let stats = state.handler.solve_quiz_sequence(&url, start).await;
            info!(
                total = stats.total,
                correct = stats.correct,
                "Background quiz task completed"
            );
        }
        .instrument(info_span!("quiz", %task_id)),
    );

    tokio::spawn(async move {
        if let Err(e) = task.await {
            error!(%task_id, "Background quiz task failed: {}", e);
        }
    });
}

/// Health check.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "email": state.config.student.email,
    }))
}

/// Service description.
pub async fn service_info(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "service": "Data Science Quiz Solver",
        "version": env!("CARGO_PKG_VERSION"),
        "student": state.config.student.email,
        "endpoints": {
            "POST /": "Submit quiz request",
            "GET /health": "Health check",
        },
    }))
}

/// Liveness probe.
pub async fn liveness() -> &'static str {
    "OK"
}
