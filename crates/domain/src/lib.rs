//! # perihub-domain
//!
//! Pure domain model for perihub, a BLE GATT peripheral driven over HTTP.
//!
//! ## Responsibilities
//! - Foundational types: attribute UUIDs, central identifiers, error taxonomy, timestamps
//! - Define **Services** and **Characteristics** (with closed property/permission sets)
//! - Define the radio **power state** and **advertising** sub-state
//! - Define **connected devices** (centrals observed through subscriptions)
//! - Define **ATT outcomes** and their protocol status codes
//! - Define control-plane **value encodings** (utf8, base64, hex)
//! - Define application **events** (data received, device connected, …)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod att;
pub mod characteristic;
pub mod device;
pub mod encoding;
pub mod event;
pub mod peripheral;
pub mod service;
