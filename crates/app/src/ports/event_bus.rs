//! Event bus port — publish application events to observers.

use std::future::Future;

use perihub_domain::event::Event;

/// Publishes application events (data received, device connected, …).
///
/// Publishing never fails from the router's point of view; an observer that
/// is gone simply misses the event.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = ()> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = ()> + Send {
        (**self).publish(event)
    }
}
