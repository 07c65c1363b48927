//! Pure milestone and pause accounting for one page view.
//!
//! Fed timestamps and browser signals, returns the actions the runtime
//! should take. All exactly-once guarantees live here, in the fired sets;
//! overlapping timer firings upstream cannot double-count.

use std::collections::HashSet;

use serde_json::json;

use analytics_core::{EventName, SessionPatch};

use crate::debounce::Debouncer;

/// Scroll-depth milestones, percent of document height.
pub const SCROLL_MILESTONES: [u8; 4] = [25, 50, 75, 100];

/// Time-on-page milestones, seconds of active (visible) time.
pub const TIME_MILESTONES_SECS: [i64; 4] = [30, 60, 120, 300];

/// Quiet window before a staged session update is released.
pub const SESSION_UPDATE_DEBOUNCE_MS: i64 = 2000;

/// Cadence of the time-on-page check.
pub const TIME_CHECK_INTERVAL_SECS: u64 = 15;

/// What the runtime should do in response to a signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Submit a milestone event.
    Emit {
        name: EventName,
        data: serde_json::Value,
    },
    /// Push a session mutation to the collector.
    UpdateSession(SessionPatch),
}

fn scroll_milestone_name(milestone: u8) -> EventName {
    match milestone {
        25 => EventName::ScrollDepth25,
        50 => EventName::ScrollDepth50,
        75 => EventName::ScrollDepth75,
        _ => EventName::ScrollDepth100,
    }
}

fn time_milestone_name(seconds: i64) -> EventName {
    match seconds {
        30 => EventName::TimeOnPage30s,
        60 => EventName::TimeOnPage60s,
        120 => EventName::TimeOnPage120s,
        _ => EventName::TimeOnPage300s,
    }
}

/// Per-page-view tracking state.
pub struct TrackerState {
    start_ms: i64,
    paused_ms: i64,
    hidden_since: Option<i64>,
    visible: bool,
    scroll_fired: HashSet<u8>,
    time_fired: HashSet<i64>,
    max_depth_seen: u8,
    update_debounce: Debouncer<SessionPatch>,
}

impl TrackerState {
    pub fn new(now_ms: i64) -> Self {
        Self {
            start_ms: now_ms,
            paused_ms: 0,
            hidden_since: None,
            visible: true,
            scroll_fired: HashSet::new(),
            time_fired: HashSet::new(),
            max_depth_seen: 0,
            update_debounce: Debouncer::new(SESSION_UPDATE_DEBOUNCE_MS),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Elapsed active seconds: wall clock minus accumulated hidden time.
    pub fn active_seconds(&self, now_ms: i64) -> i64 {
        (now_ms - self.start_ms - self.paused_ms) / 1000
    }

    /// Scroll signal. Positions are CSS pixels; depth is the scroll offset
    /// over the scrollable range, clamped to [0, 100]. Documents shorter
    /// than the viewport have no scrollable range and count as depth 0.
    ///
    /// Every signal is evaluated, so the resting position of a rapid fling
    /// always counts. Outbound volume stays bounded anyway: the fired set
    /// caps milestone events at four per page view and the session patch
    /// sits behind the debouncer.
    pub fn handle_scroll(
        &mut self,
        now_ms: i64,
        scroll_top: f64,
        document_height: f64,
        viewport_height: f64,
    ) -> Vec<Action> {
        let scrollable = document_height - viewport_height;
        let depth = if scrollable > 0.0 && scrollable.is_finite() && scroll_top.is_finite() {
            (scroll_top / scrollable * 100.0).round().clamp(0.0, 100.0) as u8
        } else {
            0
        };
        self.max_depth_seen = self.max_depth_seen.max(depth);

        let mut actions = Vec::new();
        for milestone in SCROLL_MILESTONES {
            if depth >= milestone && self.scroll_fired.insert(milestone) {
                actions.push(Action::Emit {
                    name: scroll_milestone_name(milestone),
                    data: json!({ "scrollDepth": milestone }),
                });
            }
        }

        let max_seen = self.max_depth_seen;
        self.update_debounce.push_with(
            now_ms,
            SessionPatch::scroll_depth(max_seen),
            SessionPatch::merge,
        );

        actions
    }

    /// Periodic time check. Skipped entirely while hidden; no milestone
    /// work happens in the background.
    pub fn tick(&mut self, now_ms: i64) -> Vec<Action> {
        if !self.visible {
            return Vec::new();
        }

        let seconds = self.active_seconds(now_ms);
        let mut actions = Vec::new();
        for milestone in TIME_MILESTONES_SECS {
            if seconds >= milestone && self.time_fired.insert(milestone) {
                actions.push(Action::Emit {
                    name: time_milestone_name(milestone),
                    data: json!({ "timeOnPage": milestone }),
                });
            }
        }

        if seconds > 0 && seconds % 15 == 0 {
            actions.push(Action::UpdateSession(SessionPatch::time_on_page(seconds)));
        }

        actions
    }

    /// Visibility transition. Hidden time accumulates into `paused_ms` so
    /// time-on-page reflects attention, not wall-clock presence.
    pub fn set_visibility(&mut self, now_ms: i64, visible: bool) {
        if visible {
            self.visible = true;
            if let Some(hidden_since) = self.hidden_since.take() {
                self.paused_ms += now_ms - hidden_since;
            }
        } else {
            self.visible = false;
            self.hidden_since = Some(now_ms);
        }
    }

    /// Drains the debounced session update once its window is quiet.
    pub fn take_due_update(&mut self, now_ms: i64) -> Option<SessionPatch> {
        self.update_debounce.take_due(now_ms)
    }
}
