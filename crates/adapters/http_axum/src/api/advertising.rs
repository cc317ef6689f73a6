//! Advertising control.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use perihub_domain::peripheral::PeripheralStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for starting advertising.
#[derive(Deserialize)]
pub struct StartAdvertisingRequest {
    pub local_name: String,
    /// Defaults to every primary service.
    pub service_uuids: Option<Vec<String>>,
}

/// Possible responses from the start endpoint.
pub enum StartResponse {
    /// The host stack took the request; confirmation shows up in the status.
    Accepted(Json<PeripheralStatus>),
}

impl IntoResponse for StartResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted(json) => (StatusCode::ACCEPTED, json).into_response(),
        }
    }
}

/// Possible responses from the stop endpoint.
pub enum StopResponse {
    Ok(Json<PeripheralStatus>),
}

impl IntoResponse for StopResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/advertising/start`
pub async fn start(
    State(state): State<AppState>,
    Json(req): Json<StartAdvertisingRequest>,
) -> Result<StartResponse, ApiError> {
    let service_uuids = req
        .service_uuids
        .as_deref()
        .map(super::parse_uuids)
        .transpose()?;
    state
        .peripheral
        .start_advertising(&req.local_name, service_uuids)
        .await?;
    let status = state.peripheral.status().await?;
    Ok(StartResponse::Accepted(Json(status)))
}

/// `POST /api/advertising/stop`
pub async fn stop(State(state): State<AppState>) -> Result<StopResponse, ApiError> {
    state.peripheral.stop_advertising().await?;
    let status = state.peripheral.status().await?;
    Ok(StopResponse::Ok(Json(status)))
}
