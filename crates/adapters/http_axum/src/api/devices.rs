//! Connected centrals.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use perihub_domain::device::ConnectedDevice;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<ConnectedDevice>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/devices`
pub async fn list(State(state): State<AppState>) -> Result<ListResponse, ApiError> {
    let devices = state.peripheral.list_devices().await?;
    Ok(ListResponse::Ok(Json(devices)))
}
