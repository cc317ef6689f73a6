//! # perihub-app
//!
//! Application layer — the peripheral engine and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `RadioAdapter` — commands into the host BLE stack
//!   - `EventPublisher` — fan-out of application events
//! - Own the GATT state:
//!   - `GattRegistry` — services and characteristics
//!   - `ValueStore` — values, subscriptions, read/write responses
//!   - `PeripheralStateMachine` — power state and advertising
//!   - `DeviceTracker` — centrals seen through subscriptions
//! - Serialize every mutation through the `EventRouter` task, driven by a
//!   cloneable `PeripheralHandle`
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `perihub-domain` only (plus `tokio` for the router task and
//! channels). Never imports adapter crates. Adapters depend on *this* crate,
//! not the reverse.

pub mod device_tracker;
pub mod event_bus;
pub mod ports;
pub mod presets;
pub mod registry;
pub mod router;
pub mod state_machine;
pub mod value_store;

#[cfg(test)]
mod testing;
