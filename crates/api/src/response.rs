//! Standardized API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use analytics_core::{AnalyticsEvent, AnalyticsSession};

/// Success envelope for event creation.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventResponse {
    pub success: bool,
    pub event: AnalyticsEvent,
}

impl EventResponse {
    pub fn new(event: AnalyticsEvent) -> Self {
        Self {
            success: true,
            event,
        }
    }
}

/// Success envelope for session creation, update, and lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    pub session: AnalyticsSession,
}

impl SessionResponse {
    pub fn new(session: AnalyticsSession) -> Self {
        Self {
            success: true,
            session,
        }
    }
}

/// Success envelope for event listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventListResponse {
    pub success: bool,
    pub events: Vec<AnalyticsEvent>,
    pub count: usize,
}

impl EventListResponse {
    pub fn new(events: Vec<AnalyticsEvent>) -> Self {
        let count = events.len();
        Self {
            success: true,
            events,
            count,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub events: usize,
    pub sessions: usize,
}

/// Error envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// API error: status plus envelope, convertible from core errors.
pub struct ApiError {
    pub status: StatusCode,
    pub response: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            response: ErrorResponse {
                success: false,
                error: error.into(),
                details: None,
            },
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Generic 500; the real cause is logged server-side, never leaked.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    pub fn validation(msg: impl Into<String>, details: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            response: ErrorResponse {
                success: false,
                error: msg.into(),
                details: if details.is_empty() {
                    None
                } else {
                    Some(details)
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<analytics_core::Error> for ApiError {
    fn from(err: analytics_core::Error) -> Self {
        match &err {
            analytics_core::Error::Validation(details) => {
                ApiError::validation("Invalid payload", details.clone())
            }
            analytics_core::Error::SessionNotFound(_) => ApiError::not_found("Session not found"),
            analytics_core::Error::Serialization(e) => ApiError::bad_request(e.to_string()),
            analytics_core::Error::MissingField(field) => {
                ApiError::bad_request(format!("{field} is required"))
            }
            analytics_core::Error::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                ApiError::internal()
            }
        }
    }
}
