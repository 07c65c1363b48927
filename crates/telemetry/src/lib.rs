//! Structured logging setup for the analytics collector.

pub mod tracing_setup;

pub use tracing_setup::*;
