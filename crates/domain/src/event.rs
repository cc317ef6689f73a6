//! Application-level events emitted by the peripheral.
//!
//! These are what the outside world observes of asynchronous radio
//! activity: centrals connecting, writes arriving, power flapping.

use serde::{Deserialize, Serialize};

use crate::id::{AttributeUuid, CentralId};
use crate::peripheral::{AdvertisingStatus, PeripheralState};
use crate::time::{Timestamp, now};

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A central wrote an accepted value.
    DataReceived {
        service_uuid: AttributeUuid,
        characteristic_uuid: AttributeUuid,
        central: Option<CentralId>,
        value: Vec<u8>,
    },
    /// A central subscribed for the first time.
    DeviceConnected {
        identifier: CentralId,
        name: Option<String>,
    },
    /// A central's last subscription went away.
    DeviceDisconnected { identifier: CentralId },
    PowerStateChanged { state: PeripheralState },
    AdvertisingChanged {
        status: AdvertisingStatus,
        error: Option<String>,
    },
}

/// An [`EventKind`] stamped with the time it was emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    #[must_use]
    pub fn new(kind: EventKind) -> Self {
        Self {
            timestamp: now(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_serialize_with_type_tag() {
        let event = Event::new(EventKind::DeviceDisconnected {
            identifier: CentralId::from("ABC"),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "device_disconnected");
        assert_eq!(json["identifier"], "ABC");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn should_roundtrip_data_received_through_serde_json() {
        let event = Event::new(EventKind::DataReceived {
            service_uuid: AttributeUuid::parse("180D").unwrap(),
            characteristic_uuid: AttributeUuid::parse("2A39").unwrap(),
            central: Some(CentralId::from("ABC")),
            value: vec![1, 2, 3],
        });
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
