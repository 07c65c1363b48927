//! Endpoint tests for the analytics API.

use axum::http::StatusCode;
use axum_test::TestServer;
use integration_tests::{fixtures, setup::TestContext};

fn server() -> (TestContext, TestServer) {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");
    (ctx, server)
}

#[tokio::test]
async fn post_event_returns_stored_record_with_id_and_timestamp() {
    let (_ctx, server) = server();

    let response = server
        .post("/api/analytics/event")
        .json(&fixtures::event_payload("s1", "pageview", "homepage_view"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["event"]["sessionId"], "s1");
    assert_eq!(body["event"]["eventName"], "homepage_view");
    // Server-assigned fields are present and well-formed.
    assert!(body["event"]["id"].as_str().is_some());
    let ts = body["event"]["timestamp"].as_str().expect("timestamp");
    chrono::DateTime::parse_from_rfc3339(ts).expect("parseable timestamp");
}

#[tokio::test]
async fn post_event_with_unknown_name_returns_400() {
    let (_ctx, server) = server();

    let response = server
        .post("/api/analytics/event")
        .json(&fixtures::event_payload("s1", "click", "mystery_click"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn post_event_with_malformed_json_returns_400() {
    let (_ctx, server) = server();

    let response = server
        .post("/api/analytics/event")
        .content_type("application/json")
        .bytes("not json at all".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_event_with_missing_fields_reports_details() {
    let (_ctx, server) = server();

    let response = server
        .post("/api/analytics/event")
        .json(&serde_json::json!({ "sessionId": "" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn post_session_returns_record_with_server_timestamps() {
    let (_ctx, server) = server();

    let response = server
        .post("/api/analytics/session")
        .json(&fixtures::session_payload("session_1_abc"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["session"]["id"], "session_1_abc");
    assert!(body["session"]["startTime"].as_str().is_some());
    assert!(body["session"]["lastActivity"].as_str().is_some());
    assert_eq!(body["session"]["pageViews"], 1);
}

#[tokio::test]
async fn duplicate_session_creation_is_an_upsert() {
    let (_ctx, server) = server();

    let first = server
        .post("/api/analytics/session")
        .json(&fixtures::session_payload("session_1_abc"))
        .await;
    first.assert_status_ok();
    let first: serde_json::Value = first.json();

    let second = server
        .post("/api/analytics/session")
        .json(&fixtures::session_payload("session_1_abc"))
        .await;
    second.assert_status_ok();
    let second: serde_json::Value = second.json();

    assert_eq!(
        first["session"]["startTime"], second["session"]["startTime"],
        "re-creation must not reset the visit start time"
    );
}

#[tokio::test]
async fn patch_session_updates_fields() {
    let (_ctx, server) = server();

    server
        .post("/api/analytics/session")
        .json(&fixtures::session_payload("s1"))
        .await
        .assert_status_ok();

    let response = server
        .patch("/api/analytics/session/s1")
        .json(&serde_json::json!({ "maxScrollDepth": 75, "totalTimeOnPage": 45 }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["session"]["maxScrollDepth"], 75);
    assert_eq!(body["session"]["totalTimeOnPage"], 45);
}

#[tokio::test]
async fn patch_unknown_session_returns_404() {
    let (_ctx, server) = server();

    let response = server
        .patch("/api/analytics/session/unknown-id")
        .json(&serde_json::json!({ "maxScrollDepth": 10 }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Session not found");
}

#[tokio::test]
async fn patch_without_session_id_returns_400() {
    let (_ctx, server) = server();

    let response = server
        .patch("/api/analytics/session")
        .json(&serde_json::json!({ "maxScrollDepth": 10 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Session ID is required");
}

#[tokio::test]
async fn patch_with_out_of_range_depth_returns_400() {
    let (_ctx, server) = server();

    server
        .post("/api/analytics/session")
        .json(&fixtures::session_payload("s1"))
        .await
        .assert_status_ok();

    let response = server
        .patch("/api/analytics/session/s1")
        .json(&serde_json::json!({ "maxScrollDepth": 150 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_session_round_trips() {
    let (_ctx, server) = server();

    server
        .post("/api/analytics/session")
        .json(&fixtures::session_payload("s1"))
        .await
        .assert_status_ok();

    let found = server.get("/api/analytics/session/s1").await;
    found.assert_status_ok();

    let missing = server.get("/api/analytics/session/s2").await;
    missing.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_events_filters_by_session_and_orders_newest_first() {
    let (_ctx, server) = server();

    for _ in 0..3 {
        server
            .post("/api/analytics/event")
            .json(&fixtures::event_payload("s1", "click", "hero_cta_click"))
            .await
            .assert_status_ok();
    }
    server
        .post("/api/analytics/event")
        .json(&fixtures::event_payload("s2", "click", "faq_toggle"))
        .await
        .assert_status_ok();

    let response = server
        .get("/api/analytics/events")
        .add_query_param("sessionId", "s1")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 3);
    let events = body["events"].as_array().unwrap();
    assert!(events.iter().all(|e| e["sessionId"] == "s1"));

    let timestamps: Vec<&str> = events
        .iter()
        .map(|e| e["timestamp"].as_str().unwrap())
        .collect();
    let mut sorted = timestamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(timestamps, sorted, "expected newest-first ordering");
}

#[tokio::test]
async fn list_events_honors_limit() {
    let (_ctx, server) = server();

    for _ in 0..5 {
        server
            .post("/api/analytics/event")
            .json(&fixtures::event_payload("s1", "click", "faq_toggle"))
            .await
            .assert_status_ok();
    }

    let response = server
        .get("/api/analytics/events")
        .add_query_param("limit", "2")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn event_type_is_stored_as_submitted() {
    let (_ctx, server) = server();

    let response = server
        .post("/api/analytics/event")
        .json(&fixtures::event_payload("s1", "scroll", "scroll_depth_25"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["event"]["eventType"], "scroll");
}
