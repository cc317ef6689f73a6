//! Peripheral status snapshot.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use perihub_domain::peripheral::PeripheralStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the status endpoint.
pub enum StatusResponse {
    Ok(Json<PeripheralStatus>),
}

impl IntoResponse for StatusResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/status`
pub async fn get(State(state): State<AppState>) -> Result<StatusResponse, ApiError> {
    let status = state.peripheral.status().await?;
    Ok(StatusResponse::Ok(Json(status)))
}
