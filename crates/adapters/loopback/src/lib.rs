//! # perihub-adapter-loopback
//!
//! In-process radio. Stands in for the host BLE stack when no hardware
//! binding is configured, and in end-to-end tests.
//!
//! ## How it works
//!
//! [`start`] returns two halves sharing one simulated link:
//!
//! - [`LoopbackRadio`] is handed to the event router. It records the
//!   published services, advertisement, notifications and ATT responses,
//!   and acknowledges service and advertising requests the way a host stack
//!   would: later, as radio events.
//! - [`LoopbackController`] plays the outside world: power reports,
//!   centrals subscribing, reading and writing, a congested transmit queue.
//!
//! Notifications are only accepted when some central on the link is
//! subscribed, the payload fits [`LoopbackConfig::max_payload`] and the
//! transmit queue has room.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `perihub-app` and `perihub-domain`.

mod config;
mod controller;
mod link;
mod radio;

pub use config::LoopbackConfig;
pub use controller::LoopbackController;
pub use link::{Advertisement, Notification};
pub use radio::LoopbackRadio;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use perihub_app::ports::RadioEvent;
use perihub_app::router::RadioEventSink;

use crate::link::Link;

/// Create a loopback radio feeding `sink`.
///
/// The returned task forwards the radio's acknowledgments to the router and
/// ends once the radio is dropped or the router stops.
#[must_use]
pub fn start(
    config: LoopbackConfig,
    sink: RadioEventSink,
) -> (LoopbackRadio, LoopbackController, JoinHandle<()>) {
    let link = Link::new(config.history);
    let (events, queue) = mpsc::unbounded_channel();
    let forwarder = tokio::spawn(forward(queue, sink.clone()));

    tracing::info!(
        max_payload = config.max_payload,
        history = config.history,
        "loopback radio started"
    );
    let radio = LoopbackRadio {
        config,
        link: link.clone(),
        events,
    };
    let controller = LoopbackController { link, sink };
    (radio, controller, forwarder)
}

async fn forward(mut queue: mpsc::UnboundedReceiver<RadioEvent>, sink: RadioEventSink) {
    while let Some(event) = queue.recv().await {
        if sink.send(event).await.is_err() {
            tracing::debug!("peripheral stopped, loopback forwarder exiting");
            return;
        }
    }
}
