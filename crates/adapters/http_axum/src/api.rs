//! JSON control-plane handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod advertising;
#[allow(clippy::missing_errors_doc)]
pub mod characteristics;
#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod presets;
#[allow(clippy::missing_errors_doc)]
pub mod services;
pub mod sse;
#[allow(clippy::missing_errors_doc)]
pub mod status;
#[allow(clippy::missing_errors_doc)]
pub mod values;

use axum::Router;
use axum::routing::{get, post};

use perihub_domain::error::ValidationError;
use perihub_domain::id::AttributeUuid;

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(status::get))
        // Advertising
        .route("/advertising/start", post(advertising::start))
        .route("/advertising/stop", post(advertising::stop))
        // Topology
        .route("/services", get(services::list).post(services::create))
        .route(
            "/characteristics",
            get(characteristics::list).post(characteristics::create),
        )
        // Values
        .route("/values", post(values::update))
        .route("/values/{service_uuid}/{characteristic_uuid}", get(values::get))
        // Centrals
        .route("/devices", get(devices::list))
        // Presets
        .route("/presets/heart-rate", post(presets::heart_rate))
        .route("/presets/quick-start", post(presets::quick_start))
        // Events
        .route("/events/stream", get(sse::stream))
}

fn parse_uuids(raw: &[String]) -> Result<Vec<AttributeUuid>, ValidationError> {
    raw.iter().map(|s| AttributeUuid::parse(s)).collect()
}
