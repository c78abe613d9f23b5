//! Shared application state.

use std::sync::Arc;

use evently_catalog::application::facade::QueryFacade;
use evently_core::clock::Clock;
use evently_media::ObjectStorage;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Event and booking operations over the shared store connection.
    pub facade: Arc<QueryFacade>,
    /// Where uploaded event images go.
    pub media: Arc<dyn ObjectStorage>,
    /// Clock for image object names.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        facade: Arc<QueryFacade>,
        media: Arc<dyn ObjectStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            facade,
            media,
            clock,
        }
    }
}
