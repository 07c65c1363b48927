//! Client tracking runtime.
//!
//! One [`Tracker`] instance per page view owns one session: it observes
//! scroll position, visibility transitions, and elapsed active time, emits
//! each milestone event exactly once, and delivers events to the collector
//! over an injected [`EventTransport`].
//!
//! The milestone and pause accounting lives in a pure, clock-driven
//! [`TrackerState`] so tests can replay arbitrary signal sequences without
//! timers or a network.

pub mod clock;
pub mod debounce;
pub mod state;
pub mod tracker;
pub mod transport;

pub use clock::{Clock, SystemClock};
pub use state::{Action, TrackerState};
pub use tracker::{TimerHandles, Tracker, TrackerConfig};
pub use transport::{EventTransport, HttpTransport};
