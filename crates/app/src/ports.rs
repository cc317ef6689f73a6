//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the peripheral engine and the outside
//! world: the host BLE stack on one side, observers of application events
//! on the other.

pub mod event_bus;
pub mod radio;

pub use event_bus::EventPublisher;
pub use radio::{RadioAdapter, RadioEvent, WriteRequest};
