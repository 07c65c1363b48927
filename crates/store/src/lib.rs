//! In-memory event and session storage.
//!
//! Durable for the process lifetime only. A horizontally scaled deployment
//! would lose session continuity across instances; acceptable for
//! best-effort landing-page telemetry.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use analytics_core::{AnalyticsEvent, AnalyticsSession, NewEvent, NewSession, SessionPatch};

/// Keyed maps for the two record kinds, owned exclusively by this store.
///
/// Construct one per server (or per test) and share it behind an `Arc`;
/// nothing else mutates the maps directly.
pub struct MemoryStore {
    events: Mutex<HashMap<Uuid, AnalyticsEvent>>,
    sessions: Mutex<HashMap<String, AnalyticsSession>>,
    /// High-water mark so event timestamps never decrease in insertion
    /// order, even if the wall clock steps backwards.
    last_event_at: Mutex<DateTime<Utc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
            last_event_at: Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Stores an event, assigning its id and server timestamp.
    pub fn create_event(&self, new: NewEvent) -> AnalyticsEvent {
        let timestamp = {
            let mut last = self.last_event_at.lock();
            let now = Utc::now().max(*last);
            *last = now;
            now
        };

        let event = AnalyticsEvent {
            id: Uuid::new_v4(),
            session_id: new.session_id,
            event_type: new.event_type,
            event_name: new.event_name,
            event_data: new.event_data,
            timestamp,
            user_agent: new.user_agent,
            viewport: new.viewport,
        };
        self.events.lock().insert(event.id, event.clone());
        event
    }

    /// Stores a session keyed by the client-supplied id.
    ///
    /// Re-creation under an existing id is treated as an idempotent upsert:
    /// the original start time survives and only last activity refreshes.
    /// A client retrying its init call therefore cannot reset a visit.
    pub fn create_session(&self, new: NewSession) -> AnalyticsSession {
        let now = Utc::now();
        let mut sessions = self.sessions.lock();

        if let Some(existing) = sessions.get_mut(&new.id) {
            existing.last_activity = now;
            return existing.clone();
        }

        let session = AnalyticsSession {
            id: new.id,
            start_time: now,
            last_activity: now,
            total_time_on_page: new.total_time_on_page,
            max_scroll_depth: new.max_scroll_depth,
            page_views: new.page_views,
            user_agent: new.user_agent,
            viewport: new.viewport,
        };
        sessions.insert(session.id.clone(), session.clone());
        session
    }

    /// Merges present fields into an existing session and refreshes its
    /// last-activity time. `None` when the id is unknown, so callers can
    /// answer 404 instead of 500.
    pub fn update_session(&self, id: &str, patch: SessionPatch) -> Option<AnalyticsSession> {
        let mut sessions = self.sessions.lock();
        let session = sessions.get_mut(id)?;

        if let Some(seconds) = patch.total_time_on_page {
            session.total_time_on_page = seconds;
        }
        if let Some(depth) = patch.max_scroll_depth {
            session.max_scroll_depth = depth;
        }
        if let Some(views) = patch.page_views {
            session.page_views = views;
        }
        session.last_activity = Utc::now();
        Some(session.clone())
    }

    pub fn get_session(&self, id: &str) -> Option<AnalyticsSession> {
        self.sessions.lock().get(id).cloned()
    }

    /// Bounded, newest-first snapshot of stored events, optionally filtered
    /// by session id. Not a live cursor.
    pub fn list_events(&self, session_id: Option<&str>, limit: usize) -> Vec<AnalyticsEvent> {
        let events = self.events.lock();
        let mut matched: Vec<AnalyticsEvent> = events
            .values()
            .filter(|e| session_id.map_or(true, |id| e.session_id == id))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matched.truncate(limit);
        matched
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
