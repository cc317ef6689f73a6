//! # perihub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON control-plane API** for configuring the peripheral
//!   (`/api/services`, `/api/characteristics`, `/api/values`,
//!   `/api/advertising/*`, …)
//! - Stream application events (writes from centrals, connections, power
//!   changes) as **Server-Sent Events**
//! - Parse and validate request input (UUIDs, property tokens, value
//!   encodings) before it reaches the peripheral
//! - Map peripheral results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `perihub-app` (for the peripheral handle and event bus) and
//! `perihub-domain` (for types used in request/response mapping). Never
//! leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
