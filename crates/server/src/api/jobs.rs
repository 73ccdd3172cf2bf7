//! Job submission and status API handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use reelfetch_core::{JobRequest, JobStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Result of a submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitJobResponse {
    /// False when another job was in flight and this one was dropped.
    pub accepted: bool,
}

/// Current job status plus cache occupancy.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Status kind: idle, downloading, processing, completed or error.
    pub status: String,
    /// Progress text or error message.
    pub payload: String,
    pub busy: bool,
    pub cache_entries: usize,
}

impl StatusResponse {
    fn new(status: &JobStatus, cache_entries: usize) -> Self {
        Self {
            status: status.name().to_string(),
            payload: status.payload().to_string(),
            busy: status.is_busy(),
            cache_entries,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a job. Fire-and-forget: progress is observed via status or ws.
pub async fn submit_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<JobRequest>,
) -> impl IntoResponse {
    let accepted = state.orchestrator().submit(request);
    let code = if accepted {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    (code, Json(SubmitJobResponse { accepted }))
}

/// Get the current job status
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let orchestrator = state.orchestrator();
    Json(StatusResponse::new(
        &orchestrator.current_status(),
        orchestrator.cache().len(),
    ))
}
