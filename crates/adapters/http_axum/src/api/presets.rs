//! Canned setups built from the primitive operations.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use perihub_app::presets;
use perihub_domain::peripheral::PeripheralStatus;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LOCAL_NAME: &str = "Heart Rate Monitor";

/// Optional request body for quick start.
#[derive(Default, Deserialize)]
pub struct QuickStartRequest {
    pub local_name: Option<String>,
}

/// `POST /api/presets/heart-rate`
pub async fn heart_rate(State(state): State<AppState>) -> Result<Json<PeripheralStatus>, ApiError> {
    presets::heart_rate(&state.peripheral).await?;
    let status = state.peripheral.status().await?;
    Ok(Json(status))
}

/// `POST /api/presets/quick-start`
pub async fn quick_start(
    State(state): State<AppState>,
    body: Option<Json<QuickStartRequest>>,
) -> Result<Json<PeripheralStatus>, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let local_name = req.local_name.as_deref().unwrap_or(DEFAULT_LOCAL_NAME);
    presets::quick_start(&state.peripheral, local_name).await?;
    let status = state.peripheral.status().await?;
    Ok(Json(status))
}
