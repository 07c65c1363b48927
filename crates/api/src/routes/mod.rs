//! API routes.

pub mod analytics;
pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/analytics/event", post(analytics::create_event))
        .route(
            "/api/analytics/session",
            post(analytics::create_session)
                .patch(analytics::session_id_required)
                .get(analytics::session_id_required),
        )
        .route(
            "/api/analytics/session/:session_id",
            patch(analytics::update_session).get(analytics::get_session),
        )
        .route("/api/analytics/events", get(analytics::list_events))
        .route("/health", get(health::health_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
