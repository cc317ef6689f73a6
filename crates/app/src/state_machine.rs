//! Peripheral state machine — radio power and advertising.
//!
//! Power state only changes on host-stack reports. Advertising can only be
//! entered from `PoweredOn` and is dropped whenever the radio leaves it.

use perihub_domain::error::AdvertisingError;
use perihub_domain::id::AttributeUuid;
use perihub_domain::peripheral::{AdvertisingStatus, PeripheralState};

use crate::ports::RadioAdapter;

/// Result of applying a reported power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerTransition {
    pub previous: PeripheralState,
    pub current: PeripheralState,
    /// Advertising was on and has been forced off.
    pub advertising_cleared: bool,
}

#[derive(Debug, Default)]
pub struct PeripheralStateMachine {
    state: PeripheralState,
    advertising: AdvertisingStatus,
    local_name: Option<String>,
    last_error: Option<String>,
}

impl PeripheralStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> PeripheralState {
        self.state
    }

    #[must_use]
    pub fn advertising(&self) -> AdvertisingStatus {
        self.advertising
    }

    /// Name being advertised, while advertising.
    #[must_use]
    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn apply_power_state(&mut self, state: PeripheralState) -> PowerTransition {
        let previous = std::mem::replace(&mut self.state, state);
        let advertising_cleared = !state.is_powered_on() && self.advertising.is_advertising();
        if advertising_cleared {
            self.clear_advertising();
        }
        PowerTransition {
            previous,
            current: state,
            advertising_cleared,
        }
    }

    /// Ask the host stack to advertise and optimistically mark advertising on.
    ///
    /// The acknowledgment, or a failure, arrives later as a radio event.
    ///
    /// # Errors
    ///
    /// Returns [`AdvertisingError::RadioNotReady`] unless the radio is
    /// exactly `PoweredOn`, or [`AdvertisingError::AdapterRejected`] if the
    /// host stack refuses the request immediately.
    pub fn start_advertising(
        &mut self,
        local_name: &str,
        service_uuids: &[AttributeUuid],
        radio: &mut impl RadioAdapter,
    ) -> Result<(), AdvertisingError> {
        if !self.state.is_powered_on() {
            return Err(AdvertisingError::RadioNotReady { state: self.state });
        }
        radio
            .start_advertising(local_name, service_uuids)
            .map_err(AdvertisingError::AdapterRejected)?;

        self.advertising = AdvertisingStatus::Requested;
        self.local_name = Some(local_name.to_string());
        self.last_error = None;
        Ok(())
    }

    pub fn stop_advertising(&mut self, radio: &mut impl RadioAdapter) {
        radio.stop_advertising();
        self.clear_advertising();
    }

    /// Host stack acknowledged the start. Returns `false` for a stale
    /// acknowledgment that arrives after advertising was stopped.
    pub fn advertising_started(&mut self) -> bool {
        if self.advertising != AdvertisingStatus::Requested {
            return false;
        }
        self.advertising = AdvertisingStatus::Active;
        true
    }

    pub fn advertising_failed(&mut self, reason: String) {
        self.clear_advertising();
        self.last_error = Some(reason);
    }

    /// Remember an asynchronous failure for the status query.
    pub fn record_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    fn clear_advertising(&mut self) {
        self.advertising = AdvertisingStatus::Stopped;
        self.local_name = None;
    }
}
