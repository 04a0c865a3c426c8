//! Shared application state.

use std::sync::Arc;

use casework_core::clock::Clock;
use casework_core::repository::EventRepository;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of event timestamps.
    pub clock: Arc<dyn Clock>,
    /// Event store holding every assessment stream.
    pub event_repository: Arc<dyn EventRepository>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, event_repository: Arc<dyn EventRepository>) -> Self {
        Self {
            clock,
            event_repository,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
