//! JSON REST handlers for characteristics.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use perihub_domain::characteristic::{
    Characteristic, CharacteristicInfo, PermissionSet, PropertySet,
};
use perihub_domain::id::AttributeUuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for adding a characteristic.
///
/// Unknown property or permission names are ignored; an empty (or absent)
/// list means the defaults.
#[derive(Deserialize)]
pub struct CreateCharacteristicRequest {
    pub uuid: String,
    pub service_uuid: String,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<CharacteristicInfo>>),
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
    Created(Json<Characteristic>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/characteristics`
pub async fn list(State(state): State<AppState>) -> Result<ListResponse, ApiError> {
    let characteristics = state.peripheral.list_characteristics().await?;
    Ok(ListResponse::Ok(Json(characteristics)))
}

/// `POST /api/characteristics`
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateCharacteristicRequest>,
) -> Result<CreateResponse, ApiError> {
    let uuid = AttributeUuid::parse(&req.uuid)?;
    let service_uuid = AttributeUuid::parse(&req.service_uuid)?;
    let characteristic = Characteristic::builder(uuid, service_uuid)
        .properties(PropertySet::from_tokens(&req.properties))
        .permissions(PermissionSet::from_tokens(&req.permissions))
        .build();

    state
        .peripheral
        .add_characteristic(characteristic.clone())
        .await?;
    Ok(CreateResponse::Created(Json(characteristic)))
}
