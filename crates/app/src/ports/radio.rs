//! Radio port — the contract with the host BLE stack.
//!
//! Commands flow from the event router into a [`RadioAdapter`]. Outcomes and
//! central activity flow back as [`RadioEvent`]s through a
//! [`RadioEventSink`](crate::router::RadioEventSink), landing in the same
//! mailbox as control-plane commands.

use perihub_domain::att::{ReadOutcome, WriteOutcome};
use perihub_domain::error::AdapterError;
use perihub_domain::id::{AttributeUuid, CentralId, RequestId};
use perihub_domain::peripheral::PeripheralState;
use perihub_domain::service::ServiceDefinition;

/// Commands the event router issues to the host BLE stack.
///
/// All methods are called from the router task and must return in bounded
/// time without waiting on the radio. Registration and advertising calls
/// report synchronous refusal; everything else is fire-and-forget, with the
/// real outcome arriving later as a [`RadioEvent`].
pub trait RadioAdapter: Send + 'static {
    /// Replace the published GATT database with `topology`.
    ///
    /// Host stacks need the full characteristic set of a service declared
    /// up front, so the router always hands over every service.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the host stack refuses the topology.
    fn publish_services(&mut self, topology: &[ServiceDefinition]) -> Result<(), AdapterError>;

    /// Begin advertising `local_name` and `service_uuids`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] when the request is refused outright.
    /// Later failures arrive as [`RadioEvent::AdvertisingFailed`].
    fn start_advertising(
        &mut self,
        local_name: &str,
        service_uuids: &[AttributeUuid],
    ) -> Result<(), AdapterError>;

    fn stop_advertising(&mut self);

    /// Push a value to subscribers of `characteristic`, or only to `target`.
    ///
    /// Returns `false` when nothing could be queued (no subscribers, payload
    /// too large for the link, or transmit queue full).
    fn push_value(
        &mut self,
        characteristic: &AttributeUuid,
        value: &[u8],
        target: Option<&CentralId>,
    ) -> bool;

    fn respond_read(&mut self, request: RequestId, outcome: &ReadOutcome);

    fn respond_write(&mut self, request: RequestId, outcome: WriteOutcome);
}

/// One write inside a (possibly batched) write event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub request: RequestId,
    pub central: Option<CentralId>,
    pub characteristic: AttributeUuid,
    pub value: Vec<u8>,
}

/// Events produced by the host BLE stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent {
    PowerStateChanged(PeripheralState),
    AdvertisingStarted,
    AdvertisingFailed {
        reason: String,
    },
    ServiceAdded {
        uuid: AttributeUuid,
    },
    ServiceAddFailed {
        uuid: AttributeUuid,
        reason: String,
    },
    CentralSubscribed {
        central: CentralId,
        characteristic: AttributeUuid,
        /// Display name, if the host stack knows it.
        name: Option<String>,
    },
    CentralUnsubscribed {
        central: CentralId,
        characteristic: AttributeUuid,
    },
    /// The link to a central dropped; all its subscriptions are gone.
    CentralDisconnected {
        central: CentralId,
    },
    ReadRequested {
        request: RequestId,
        central: Option<CentralId>,
        characteristic: AttributeUuid,
    },
    WriteRequested(Vec<WriteRequest>),
    /// The transmit queue has room again after a failed push.
    ReadyToResume,
}
