//! Analytics endpoint handlers.
//!
//! Boundary validation and status-code mapping only: parse against the
//! schema, delegate to the store, map the outcome. Bodies come in as raw
//! bytes so malformed JSON surfaces as a 400 with detail rather than the
//! framework's default rejection.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{debug, warn};

use analytics_core::limits::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use analytics_core::schema;

use crate::response::{ApiError, EventListResponse, EventResponse, SessionResponse};
use crate::state::AppState;

/// POST /api/analytics/event
pub async fn create_event(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<EventResponse>, ApiError> {
    let new_event = schema::parse_event(&body).map_err(|e| {
        warn!(error = %e, "analytics event creation failed");
        ApiError::from(e)
    })?;

    let event = state.store.create_event(new_event);
    debug!(event_id = %event.id, session_id = %event.session_id, "event stored");
    Ok(Json(EventResponse::new(event)))
}

/// POST /api/analytics/session
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SessionResponse>, ApiError> {
    let new_session = schema::parse_session(&body).map_err(|e| {
        warn!(error = %e, "analytics session creation failed");
        ApiError::from(e)
    })?;

    let session = state.store.create_session(new_session);
    debug!(session_id = %session.id, "session stored");
    Ok(Json(SessionResponse::new(session)))
}

/// PATCH /api/analytics/session/:session_id
pub async fn update_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Result<Json<SessionResponse>, ApiError> {
    if session_id.trim().is_empty() {
        return Err(analytics_core::Error::missing_field("Session ID").into());
    }

    let patch = schema::parse_session_patch(&body).map_err(|e| {
        warn!(session_id = %session_id, error = %e, "analytics session update failed");
        ApiError::from(e)
    })?;

    match state.store.update_session(&session_id, patch) {
        Some(session) => Ok(Json(SessionResponse::new(session))),
        None => Err(ApiError::not_found("Session not found")),
    }
}

/// GET /api/analytics/session/:session_id (debug/inspection surface).
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    match state.store.get_session(&session_id) {
        Some(session) => Ok(Json(SessionResponse::new(session))),
        None => Err(ApiError::not_found("Session not found")),
    }
}

/// Catch-all for session routes hit without an id segment.
pub async fn session_id_required() -> ApiError {
    analytics_core::Error::missing_field("Session ID").into()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub session_id: Option<String>,
    pub limit: Option<usize>,
}

/// GET /api/analytics/events?sessionId=&limit= (debug/inspection surface).
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<EventListResponse> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .min(MAX_LIST_LIMIT);
    let events = state.store.list_events(query.session_id.as_deref(), limit);
    Json(EventListResponse::new(events))
}
