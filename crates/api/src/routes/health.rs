//! Health check endpoint.

use axum::{extract::State, Json};

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health - liveness plus store occupancy.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        events: state.store.event_count(),
        sessions: state.store.session_count(),
    })
}
