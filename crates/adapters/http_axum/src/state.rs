//! Shared application state for axum handlers.

use std::sync::Arc;

use perihub_app::event_bus::InProcessEventBus;
use perihub_app::router::PeripheralHandle;

/// Application state shared across all axum handlers.
///
/// The peripheral itself lives in the event router task; handlers only hold
/// a handle to its mailbox.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the running event router.
    pub peripheral: PeripheralHandle,
    /// Event bus for real-time SSE streaming.
    pub event_bus: Arc<InProcessEventBus>,
}

impl AppState {
    #[must_use]
    pub fn new(peripheral: PeripheralHandle, event_bus: Arc<InProcessEventBus>) -> Self {
        Self {
            peripheral,
            event_bus,
        }
    }
}
