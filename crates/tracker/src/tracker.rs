//! The tracking runtime facade.
//!
//! Owns one session for the lifetime of a page view. Signal handlers and
//! timers feed the pure [`TrackerState`]; resulting actions go out through
//! the transport. Delivery failures are logged and swallowed everywhere
//! except conversion tracking, which may return its error to the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeZone;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::warn;
use uuid::Uuid;

use analytics_core::{EventName, NewEvent, NewSession, Result, SessionPatch, Viewport};

use crate::clock::Clock;
use crate::state::{Action, TrackerState, TIME_CHECK_INTERVAL_SECS};
use crate::transport::EventTransport;

/// Cadence for draining the debounced session update.
const FLUSH_POLL_MS: u64 = 500;

/// Static facts about the page view, captured once at construction.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub user_agent: String,
    pub viewport_width: u32,
}

/// One tracking runtime per page view.
pub struct Tracker {
    session_id: String,
    user_agent: String,
    viewport: Viewport,
    transport: Arc<dyn EventTransport>,
    clock: Arc<dyn Clock>,
    state: Mutex<TrackerState>,
    initialized: AtomicBool,
}

impl Tracker {
    pub fn new(
        config: TrackerConfig,
        transport: Arc<dyn EventTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now_ms = clock.now_ms();
        Self {
            session_id: generate_session_id(now_ms),
            user_agent: config.user_agent,
            viewport: Viewport::from_width(config.viewport_width),
            transport,
            clock,
            state: Mutex::new(TrackerState::new(now_ms)),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Creates the session record and emits the initial page view.
    ///
    /// Idempotent for the life of this instance; repeat calls are no-ops.
    /// Failures are logged and never surface, so a dead collector cannot
    /// block the page.
    pub async fn init_session(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        let session = NewSession {
            id: self.session_id.clone(),
            total_time_on_page: 0,
            max_scroll_depth: 0,
            page_views: 1,
            user_agent: Some(self.user_agent.clone()),
            viewport: Some(self.viewport),
        };

        if let Err(e) = self.transport.create_session(&session).await {
            warn!(error = %e, "analytics session initialization failed");
        }

        self.track_event(EventName::HomepageView, None).await;
    }

    /// Submits one event. Failures are logged, never propagated; tracking
    /// must never break the page.
    pub async fn track_event(&self, name: EventName, data: Option<Value>) {
        let event = self.new_event(name, data);
        if let Err(e) = self.transport.submit_event(&event).await {
            warn!(event = name.as_str(), error = %e, "analytics event tracking failed");
        }
    }

    /// Fire-and-forget click tracking with element and timestamp attached.
    pub fn track_click(self: &Arc<Self>, name: EventName, element: Option<&str>, extra: Option<Value>) {
        let data = self.interaction_data(element, extra);
        let tracker = self.clone();
        tokio::spawn(async move {
            tracker.track_event(name, Some(data)).await;
        });
    }

    /// Reliability-hardened delivery for events that must survive page
    /// navigation: beacon first, keepalive second, ordinary path last.
    /// Only this path may return an error, and callers triggering
    /// fire-and-forget UI actions are expected to swallow it.
    pub async fn track_conversion(
        &self,
        name: EventName,
        element: Option<&str>,
        extra: Option<Value>,
    ) -> Result<()> {
        let data = self.interaction_data(element, extra);
        let event = self.new_event(name, Some(data.clone()));

        match self.transport.send_beacon(&event).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "beacon delivery failed"),
        }

        match self.transport.submit_event_keepalive(&event).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "conversion tracking failed");
                self.track_event(name, Some(data)).await;
                Err(e)
            }
        }
    }

    /// Scroll signal from the page. Idempotent inside the state machine;
    /// repeated threshold crossings cannot double-count.
    pub async fn on_scroll(&self, scroll_top: f64, document_height: f64, viewport_height: f64) {
        let actions = {
            let mut state = self.state.lock();
            state.handle_scroll(self.clock.now_ms(), scroll_top, document_height, viewport_height)
        };
        self.apply(actions).await;
    }

    /// Visibility transition from the page.
    pub fn on_visibility_change(&self, visible: bool) {
        self.state.lock().set_visibility(self.clock.now_ms(), visible);
    }

    /// Periodic time-on-page check; driven by [`Tracker::spawn_timers`] in
    /// production and called directly in tests.
    pub async fn tick(&self) {
        let actions = {
            let mut state = self.state.lock();
            state.tick(self.clock.now_ms())
        };
        self.apply(actions).await;
    }

    /// Releases the debounced session update if its quiet window elapsed.
    pub async fn flush_pending_update(&self) {
        let due = {
            let mut state = self.state.lock();
            state.take_due_update(self.clock.now_ms())
        };
        if let Some(patch) = due {
            self.push_session_update(patch).await;
        }
    }

    /// Starts the interval tasks: the 15s time check and the debounce
    /// drain. Handles abort on drop, so teardown cancels cleanly.
    pub fn spawn_timers(self: &Arc<Self>) -> TimerHandles {
        let tracker = self.clone();
        let tick_handle = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(TIME_CHECK_INTERVAL_SECS));
            interval.tick().await;
            loop {
                interval.tick().await;
                tracker.tick().await;
            }
        });

        let tracker = self.clone();
        let flush_handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(FLUSH_POLL_MS));
            loop {
                interval.tick().await;
                tracker.flush_pending_update().await;
            }
        });

        TimerHandles {
            handles: vec![tick_handle, flush_handle],
        }
    }

    async fn apply(&self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Emit { name, data } => self.track_event(name, Some(data)).await,
                Action::UpdateSession(patch) => self.push_session_update(patch).await,
            }
        }
    }

    async fn push_session_update(&self, patch: SessionPatch) {
        if let Err(e) = self.transport.update_session(&self.session_id, &patch).await {
            warn!(error = %e, "analytics session update failed");
        }
    }

    fn new_event(&self, name: EventName, data: Option<Value>) -> NewEvent {
        NewEvent {
            session_id: self.session_id.clone(),
            event_type: name.event_type(),
            event_name: name,
            event_data: data,
            user_agent: Some(self.user_agent.clone()),
            viewport: Some(self.viewport),
        }
    }

    /// Click/conversion payload: element identifier, client-side timestamp,
    /// then any caller-supplied keys on top.
    fn interaction_data(&self, element: Option<&str>, extra: Option<Value>) -> Value {
        let mut map = serde_json::Map::new();
        if let Some(element) = element {
            map.insert("element".to_string(), json!(element));
        }
        map.insert("timestamp".to_string(), json!(self.iso_now()));
        if let Some(Value::Object(extra)) = extra {
            map.extend(extra);
        }
        Value::Object(map)
    }

    fn iso_now(&self) -> String {
        chrono::Utc
            .timestamp_millis_opt(self.clock.now_ms())
            .single()
            .unwrap_or_else(chrono::Utc::now)
            .to_rfc3339()
    }
}

/// Interval task handles; aborted when dropped.
pub struct TimerHandles {
    handles: Vec<JoinHandle<()>>,
}

impl Drop for TimerHandles {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

fn generate_session_id(now_ms: i64) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("session_{}_{}", now_ms, &suffix[..9])
}
