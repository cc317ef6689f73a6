//! HTTP error response mapping.

use std::error::Error as _;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use perihub_domain::error::{
    AdvertisingError, EncodingError, PeripheralError, RegistryError, ValidationError, ValueError,
};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`PeripheralError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(PeripheralError);

impl From<PeripheralError> for ApiError {
    fn from(err: PeripheralError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<EncodingError> for ApiError {
    fn from(err: EncodingError) -> Self {
        Self(ValueError::from(err).into())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            PeripheralError::Validation(_) => StatusCode::BAD_REQUEST,
            PeripheralError::Registry(err) => match err {
                RegistryError::ServiceNotFound { .. } => StatusCode::NOT_FOUND,
                RegistryError::DuplicateService { .. }
                | RegistryError::DuplicateCharacteristic { .. } => StatusCode::CONFLICT,
                RegistryError::AdapterRejected(_) => StatusCode::BAD_GATEWAY,
            },
            PeripheralError::Value(err) => match err {
                ValueError::CharacteristicNotFound { .. } => StatusCode::NOT_FOUND,
                ValueError::InvalidEncoding(_) => StatusCode::BAD_REQUEST,
            },
            PeripheralError::Advertising(err) => match err {
                AdvertisingError::RadioNotReady { .. } => StatusCode::CONFLICT,
                AdvertisingError::AdapterRejected(_) => StatusCode::BAD_GATEWAY,
            },
            PeripheralError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// The most specific message first, followed by its causes.
    fn message(&self) -> String {
        let mut message = match self.0.source() {
            Some(inner) => inner.to_string(),
            None => return self.0.to_string(),
        };
        let mut cause = self.0.source().and_then(|inner| inner.source());
        while let Some(err) = cause {
            message.push_str(": ");
            message.push_str(&err.to_string());
            cause = err.source();
        }
        message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(error = %message, "peripheral request failed");
        } else {
            tracing::debug!(error = %message, %status, "peripheral request rejected");
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
