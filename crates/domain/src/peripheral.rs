//! Radio power state, advertising sub-state and the observable status snapshot.

use serde::{Deserialize, Serialize};

/// Power state of the local radio as reported by the host stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeripheralState {
    #[default]
    Unknown,
    Resetting,
    Unsupported,
    Unauthorized,
    PoweredOff,
    PoweredOn,
}

impl PeripheralState {
    /// Whether the radio can advertise and serve GATT requests.
    #[must_use]
    pub fn is_powered_on(self) -> bool {
        matches!(self, Self::PoweredOn)
    }
}

impl std::fmt::Display for PeripheralState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Resetting => "resetting",
            Self::Unsupported => "unsupported",
            Self::Unauthorized => "unauthorized",
            Self::PoweredOff => "poweredOff",
            Self::PoweredOn => "poweredOn",
        })
    }
}

/// Advertising sub-state.
///
/// `Requested` is entered optimistically when the start command is issued;
/// the host stack's acknowledgment moves it to `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvertisingStatus {
    #[default]
    Stopped,
    Requested,
    Active,
}

impl AdvertisingStatus {
    /// The boolean advertising flag exposed to callers.
    #[must_use]
    pub fn is_advertising(self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

/// Point-in-time view returned by the status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheralStatus {
    pub state: PeripheralState,
    pub advertising: bool,
    pub advertising_status: AdvertisingStatus,
    pub local_name: Option<String>,
    pub connected_devices: usize,
    pub services: usize,
    pub characteristics: usize,
    pub last_error: Option<String>,
}
