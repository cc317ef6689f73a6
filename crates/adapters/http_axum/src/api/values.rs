//! Characteristic values.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use perihub_domain::encoding::ValueEncoding;
use perihub_domain::id::{AttributeUuid, CentralId};

use crate::error::ApiError;
use crate::state::AppState;

fn parse_encoding(raw: Option<&str>) -> Result<ValueEncoding, ApiError> {
    Ok(raw.map(str::parse::<ValueEncoding>).transpose()?.unwrap_or_default())
}

/// Request body for updating a value.
#[derive(Deserialize)]
pub struct UpdateValueRequest {
    pub service_uuid: String,
    pub characteristic_uuid: String,
    pub value: String,
    /// `utf8` (default), `base64` or `hex`.
    pub encoding: Option<String>,
    /// Notify only this central instead of every subscriber.
    pub central_id: Option<String>,
}

/// Outcome of a value update.
#[derive(Debug, Serialize)]
pub struct UpdateValueBody {
    pub service_uuid: AttributeUuid,
    pub characteristic_uuid: AttributeUuid,
    pub length: usize,
    pub notified: bool,
    pub subscribers: usize,
    pub parked: bool,
}

/// Query string of the read endpoint.
#[derive(Deserialize)]
pub struct ValueQuery {
    pub encoding: Option<String>,
}

/// Current value of a characteristic, `null` if never written.
#[derive(Debug, Serialize)]
pub struct ValueBody {
    pub service_uuid: AttributeUuid,
    pub characteristic_uuid: AttributeUuid,
    pub encoding: ValueEncoding,
    pub value: Option<String>,
}

/// Possible responses from the update endpoint.
pub enum UpdateResponse {
    Ok(Json<UpdateValueBody>),
}

impl IntoResponse for UpdateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<ValueBody>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/values`
pub async fn update(
    State(state): State<AppState>,
    Json(req): Json<UpdateValueRequest>,
) -> Result<UpdateResponse, ApiError> {
    let service_uuid = AttributeUuid::parse(&req.service_uuid)?;
    let characteristic_uuid = AttributeUuid::parse(&req.characteristic_uuid)?;
    let encoding = parse_encoding(req.encoding.as_deref())?;
    let value = encoding.decode(&req.value)?;
    let length = value.len();
    let target = req.central_id.map(CentralId::new);

    let delivery = state
        .peripheral
        .update_value(
            service_uuid.clone(),
            characteristic_uuid.clone(),
            value,
            target,
        )
        .await?;
    Ok(UpdateResponse::Ok(Json(UpdateValueBody {
        service_uuid,
        characteristic_uuid,
        length,
        notified: delivery.notified,
        subscribers: delivery.subscribers,
        parked: delivery.parked,
    })))
}

/// `GET /api/values/{service_uuid}/{characteristic_uuid}`
pub async fn get(
    State(state): State<AppState>,
    Path((service_uuid, characteristic_uuid)): Path<(String, String)>,
    Query(query): Query<ValueQuery>,
) -> Result<GetResponse, ApiError> {
    let service_uuid = AttributeUuid::parse(&service_uuid)?;
    let characteristic_uuid = AttributeUuid::parse(&characteristic_uuid)?;
    let encoding = parse_encoding(query.encoding.as_deref())?;

    let value = state
        .peripheral
        .get_value(service_uuid.clone(), characteristic_uuid.clone())
        .await?
        .map(|bytes| encoding.encode(&bytes))
        .transpose()?;
    Ok(GetResponse::Ok(Json(ValueBody {
        service_uuid,
        characteristic_uuid,
        encoding,
        value,
    })))
}
