//! Clock-driven coalescing primitive.
//!
//! A plain state machine fed timestamps rather than a wrapper over a
//! timer API: the runtime polls it from its own intervals, and tests feed
//! it a manual clock.

/// Trailing-edge debouncer: coalesces rapid-fire values and releases the
/// merged result once the window has been quiet.
#[derive(Debug)]
pub struct Debouncer<T> {
    window_ms: i64,
    pending: Option<T>,
    deadline: Option<i64>,
}

impl<T> Debouncer<T> {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            pending: None,
            deadline: None,
        }
    }

    /// Stages a value, merging with anything already pending, and pushes
    /// the release deadline out by one window.
    pub fn push_with(&mut self, now_ms: i64, value: T, merge: impl FnOnce(&mut T, T)) {
        match self.pending.as_mut() {
            Some(pending) => merge(pending, value),
            None => self.pending = Some(value),
        }
        self.deadline = Some(now_ms + self.window_ms);
    }

    /// Releases the pending value once the deadline has passed.
    pub fn take_due(&mut self, now_ms: i64) -> Option<T> {
        if self.deadline.is_some_and(|d| now_ms >= d) {
            self.deadline = None;
            self.pending.take()
        } else {
            None
        }
    }
}
