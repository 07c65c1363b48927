//! End-to-end tests: the tracking runtime driving the collector's
//! validation and store through a loopback transport.
//!
//! The loopback serializes every payload to its wire form and feeds it
//! through the same schema parsing the HTTP handlers use, so a tracker
//! payload that would 400 at the endpoint fails here too.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use analytics_core::{schema, Error, EventName, NewEvent, NewSession, Result, SessionPatch};
use analytics_store::MemoryStore;
use analytics_tracker::{Clock, EventTransport, Tracker, TrackerConfig};

struct ManualClock {
    ms: AtomicI64,
}

impl ManualClock {
    fn new(ms: i64) -> Self {
        Self {
            ms: AtomicI64::new(ms),
        }
    }

    fn set(&self, ms: i64) {
        self.ms.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.ms.load(Ordering::SeqCst)
    }
}

/// Transport that validates wire payloads and writes straight to a store.
struct LoopbackTransport {
    store: Arc<MemoryStore>,
}

#[async_trait]
impl EventTransport for LoopbackTransport {
    async fn create_session(&self, session: &NewSession) -> Result<()> {
        let raw = serde_json::to_vec(session)?;
        let parsed = schema::parse_session(&raw)?;
        self.store.create_session(parsed);
        Ok(())
    }

    async fn submit_event(&self, event: &NewEvent) -> Result<()> {
        let raw = serde_json::to_vec(event)?;
        let parsed = schema::parse_event(&raw)?;
        self.store.create_event(parsed);
        Ok(())
    }

    async fn update_session(&self, id: &str, patch: &SessionPatch) -> Result<()> {
        let raw = serde_json::to_vec(patch)?;
        let parsed = schema::parse_session_patch(&raw)?;
        self.store
            .update_session(id, parsed)
            .map(|_| ())
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))
    }

    async fn send_beacon(&self, _event: &NewEvent) -> Result<bool> {
        Ok(false)
    }

    async fn submit_event_keepalive(&self, event: &NewEvent) -> Result<()> {
        self.submit_event(event).await
    }
}

fn build(
    start_ms: i64,
) -> (Arc<Tracker>, Arc<MemoryStore>, Arc<ManualClock>) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(start_ms));
    let tracker = Arc::new(Tracker::new(
        TrackerConfig {
            user_agent: "e2e-test-agent".to_string(),
            viewport_width: 390,
        },
        Arc::new(LoopbackTransport {
            store: store.clone(),
        }),
        clock.clone(),
    ));
    (tracker, store, clock)
}

#[tokio::test]
async fn full_page_view_flow_lands_in_the_store() {
    let (tracker, store, clock) = build(0);

    tracker.init_session().await;

    // Scroll to 60%, let the debounce window pass, and cross 30s active.
    tracker.on_scroll(1200.0, 3000.0, 1000.0).await;
    clock.set(2_500);
    tracker.flush_pending_update().await;
    clock.set(30_000);
    tracker.tick().await;

    let session = store.get_session(tracker.session_id()).expect("session");
    assert_eq!(session.max_scroll_depth, 60);
    assert_eq!(session.total_time_on_page, 30);
    assert_eq!(session.page_views, 1);
    assert!(session.last_activity >= session.start_time);

    let events = store.list_events(Some(tracker.session_id()), 100);
    let names: Vec<EventName> = events.iter().map(|e| e.event_name).collect();
    assert!(names.contains(&EventName::HomepageView));
    assert!(names.contains(&EventName::ScrollDepth25));
    assert!(names.contains(&EventName::ScrollDepth50));
    assert!(names.contains(&EventName::TimeOnPage30s));
    assert!(!names.contains(&EventName::ScrollDepth75));

    // Snapshot is newest-first.
    assert!(events
        .windows(2)
        .all(|w| w[0].timestamp >= w[1].timestamp));
}

#[tokio::test]
async fn conversion_event_reaches_the_store_via_keepalive() {
    let (tracker, store, _clock) = build(0);
    tracker.init_session().await;

    tracker
        .track_conversion(EventName::PremiumPackage, Some("premium-buy"), None)
        .await
        .expect("keepalive delivery");

    let events = store.list_events(Some(tracker.session_id()), 100);
    let conversion = events
        .iter()
        .find(|e| e.event_name == EventName::PremiumPackage)
        .expect("conversion stored");
    let data = conversion.event_data.as_ref().unwrap();
    assert_eq!(data["element"], "premium-buy");
}

#[tokio::test]
async fn milestones_survive_the_wire_format_round_trip() {
    let (tracker, store, clock) = build(0);
    tracker.init_session().await;

    // Full scroll fires all four depth events; re-crossing adds nothing.
    tracker.on_scroll(2000.0, 3000.0, 1000.0).await;
    clock.set(500);
    tracker.on_scroll(2000.0, 3000.0, 1000.0).await;

    let events = store.list_events(Some(tracker.session_id()), 100);
    let depth_events: Vec<_> = events
        .iter()
        .filter(|e| {
            matches!(
                e.event_name,
                EventName::ScrollDepth25
                    | EventName::ScrollDepth50
                    | EventName::ScrollDepth75
                    | EventName::ScrollDepth100
            )
        })
        .collect();
    assert_eq!(depth_events.len(), 4);
}

#[tokio::test]
async fn session_update_before_creation_is_swallowed() {
    let (tracker, store, clock) = build(0);

    // No init: the update has nowhere to land and the failure must not
    // escape the runtime.
    tracker.on_scroll(1200.0, 3000.0, 1000.0).await;
    clock.set(2_500);
    tracker.flush_pending_update().await;

    assert!(store.get_session(tracker.session_id()).is_none());
}
