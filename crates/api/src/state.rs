//! Application state shared across handlers.

use std::sync::Arc;

use analytics_store::MemoryStore;

/// Shared application state: the store, explicitly constructed and owned
/// here so tests can build a fresh one per case.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryStore>,
}

impl AppState {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}
