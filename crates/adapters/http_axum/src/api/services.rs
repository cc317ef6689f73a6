//! JSON REST handlers for services.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use perihub_domain::id::AttributeUuid;
use perihub_domain::service::Service;

use crate::error::ApiError;
use crate::state::AppState;

fn default_primary() -> bool {
    true
}

/// Request body for adding a service.
#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub uuid: String,
    #[serde(default = "default_primary")]
    pub is_primary: bool,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Service>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Service>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/services`
pub async fn list(State(state): State<AppState>) -> Result<ListResponse, ApiError> {
    let services = state.peripheral.list_services().await?;
    Ok(ListResponse::Ok(Json(services)))
}

/// `POST /api/services`
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateServiceRequest>,
) -> Result<CreateResponse, ApiError> {
    let uuid = AttributeUuid::parse(&req.uuid)?;
    state
        .peripheral
        .add_service(uuid.clone(), req.is_primary)
        .await?;
    Ok(CreateResponse::Created(Json(Service::new(
        uuid,
        req.is_primary,
    ))))
}
