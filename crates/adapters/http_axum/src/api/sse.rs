//! Server-Sent Events (SSE) stream of application events.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::state::AppState;

/// `GET /api/events/stream` — SSE stream of peripheral events.
///
/// Each frame carries the JSON-encoded event in `data:` and its type in
/// `event:`. The stream ends when the client disconnects or the bus closes.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let event_rx = state.event_bus.subscribe();
    let event_stream = BroadcastStream::new(event_rx).filter_map(|result| match result {
        Ok(event) => match Event::default().json_data(&event) {
            Ok(frame) => Some(Ok(frame.event(event_name(&event)))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize event for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE subscriber lagged, some events were dropped");
            None
        }
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}

fn event_name(event: &perihub_domain::event::Event) -> &'static str {
    use perihub_domain::event::EventKind;

    match event.kind {
        EventKind::DataReceived { .. } => "data_received",
        EventKind::DeviceConnected { .. } => "device_connected",
        EventKind::DeviceDisconnected { .. } => "device_disconnected",
        EventKind::PowerStateChanged { .. } => "power_state_changed",
        EventKind::AdvertisingChanged { .. } => "advertising_changed",
    }
}
