//! Error types shared across the workspace.
//!
//! Each component returns its own typed error; [`PeripheralError`] is the
//! umbrella the control plane sees, built via `#[from]` conversions.

use crate::id::AttributeUuid;
use crate::peripheral::PeripheralState;

/// Top-level error returned by peripheral operations.
#[derive(Debug, thiserror::Error)]
pub enum PeripheralError {
    #[error("invalid input")]
    Validation(#[from] ValidationError),

    #[error("registry error")]
    Registry(#[from] RegistryError),

    #[error("value error")]
    Value(#[from] ValueError),

    #[error("advertising error")]
    Advertising(#[from] AdvertisingError),

    /// The event router task has stopped and can no longer serve commands.
    #[error("peripheral is not running")]
    Unavailable,
}

/// Malformed input at the control-plane boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid attribute UUID {0:?}")]
    InvalidUuid(String),

    #[error("local name must not be empty")]
    EmptyLocalName,
}

/// Failures of the GATT registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("service {uuid} not found")]
    ServiceNotFound { uuid: AttributeUuid },

    #[error("service {uuid} already exists")]
    DuplicateService { uuid: AttributeUuid },

    #[error("characteristic {uuid} already exists")]
    DuplicateCharacteristic { uuid: AttributeUuid },

    #[error("radio adapter rejected the service topology")]
    AdapterRejected(#[source] AdapterError),
}

/// Failures of the value store.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error("characteristic {uuid} not found")]
    CharacteristicNotFound { uuid: AttributeUuid },

    #[error("invalid value encoding")]
    InvalidEncoding(#[from] EncodingError),
}

/// Failures when starting advertising.
#[derive(Debug, thiserror::Error)]
pub enum AdvertisingError {
    #[error("radio is not ready (state: {state})")]
    RadioNotReady { state: PeripheralState },

    #[error("radio adapter rejected the advertising request")]
    AdapterRejected(#[source] AdapterError),
}

/// A synchronous call into the host BLE stack was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct AdapterError {
    pub reason: String,
}

impl AdapterError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Why a control-plane value could not be decoded or encoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("malformed base64 input")]
    Base64(#[source] data_encoding::DecodeError),

    #[error("malformed hex input")]
    Hex(#[source] data_encoding::DecodeError),

    #[error("value is not valid UTF-8")]
    Utf8,

    #[error("unknown encoding {0:?}")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_duplicate_service_with_uuid() {
        let err = RegistryError::DuplicateService {
            uuid: AttributeUuid::parse("180d").unwrap(),
        };
        assert_eq!(err.to_string(), "service 180D already exists");
    }

    #[test]
    fn should_display_radio_not_ready_with_state() {
        let err = AdvertisingError::RadioNotReady {
            state: PeripheralState::PoweredOff,
        };
        assert_eq!(err.to_string(), "radio is not ready (state: poweredOff)");
    }

    #[test]
    fn should_convert_nested_errors_into_peripheral_error() {
        let err: PeripheralError = ValueError::CharacteristicNotFound {
            uuid: AttributeUuid::parse("2a37").unwrap(),
        }
        .into();
        assert!(matches!(
            err,
            PeripheralError::Value(ValueError::CharacteristicNotFound { .. })
        ));
    }

    #[test]
    fn should_display_adapter_reason() {
        let err = AdapterError::new("advertising data too large");
        assert_eq!(err.to_string(), "advertising data too large");
    }
}
