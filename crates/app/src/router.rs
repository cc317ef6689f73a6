//! Event router — the single serialization point of the peripheral.
//!
//! Control-plane commands (through [`PeripheralHandle`]) and host-stack
//! events (through [`RadioEventSink`]) share one bounded mailbox. A single
//! task drains it, so every mutation of the registry, value store and state
//! machine is applied whole and in arrival order.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use perihub_domain::att::WriteOutcome;
use perihub_domain::characteristic::{Characteristic, CharacteristicInfo};
use perihub_domain::device::ConnectedDevice;
use perihub_domain::error::{PeripheralError, ValidationError};
use perihub_domain::event::{Event, EventKind};
use perihub_domain::id::{AttributeUuid, CentralId};
use perihub_domain::peripheral::{AdvertisingStatus, PeripheralStatus};
use perihub_domain::service::Service;
use perihub_domain::time::now;

use crate::device_tracker::DeviceTracker;
use crate::ports::{EventPublisher, RadioAdapter, RadioEvent, WriteRequest};
use crate::registry::GattRegistry;
use crate::state_machine::PeripheralStateMachine;
use crate::value_store::{Delivery, ValueStore};

type Reply<T> = oneshot::Sender<Result<T, PeripheralError>>;

#[derive(Debug)]
enum Command {
    Status {
        reply: Reply<PeripheralStatus>,
    },
    AddService {
        uuid: AttributeUuid,
        is_primary: bool,
        reply: Reply<()>,
    },
    AddCharacteristic {
        characteristic: Characteristic,
        reply: Reply<()>,
    },
    ListServices {
        reply: Reply<Vec<Service>>,
    },
    ListCharacteristics {
        reply: Reply<Vec<CharacteristicInfo>>,
    },
    StartAdvertising {
        local_name: String,
        service_uuids: Option<Vec<AttributeUuid>>,
        reply: Reply<()>,
    },
    StopAdvertising {
        reply: Reply<()>,
    },
    UpdateValue {
        service_uuid: AttributeUuid,
        characteristic_uuid: AttributeUuid,
        value: Vec<u8>,
        target: Option<CentralId>,
        reply: Reply<Delivery>,
    },
    GetValue {
        service_uuid: AttributeUuid,
        characteristic_uuid: AttributeUuid,
        reply: Reply<Option<Vec<u8>>>,
    },
    ListDevices {
        reply: Reply<Vec<ConnectedDevice>>,
    },
}

#[derive(Debug)]
enum Message {
    Command(Command),
    Radio(RadioEvent),
}

/// Receiving end of the router's mailbox, handed to [`EventRouter::spawn`].
#[derive(Debug)]
pub struct Mailbox {
    receiver: mpsc::Receiver<Message>,
}

/// Where a [`RadioAdapter`] delivers host-stack events.
#[derive(Debug, Clone)]
pub struct RadioEventSink {
    sender: mpsc::Sender<Message>,
}

impl RadioEventSink {
    /// Queue an event behind everything already in the mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    pub async fn send(&self, event: RadioEvent) -> Result<(), PeripheralError> {
        self.sender
            .send(Message::Radio(event))
            .await
            .map_err(|_| PeripheralError::Unavailable)
    }
}

/// Cloneable handle the control plane uses to drive the peripheral.
///
/// Each call is a request/response round-trip through the router's
/// mailbox; concurrent callers are served in the order they reach it.
#[derive(Debug, Clone)]
pub struct PeripheralHandle {
    sender: mpsc::Sender<Message>,
}

impl PeripheralHandle {
    /// Create a handle and the mailbox its router will drain.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, Mailbox) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, Mailbox { receiver })
    }

    /// A sink for the radio adapter feeding this peripheral.
    #[must_use]
    pub fn radio_sink(&self) -> RadioEventSink {
        RadioEventSink {
            sender: self.sender.clone(),
        }
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, PeripheralError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(Message::Command(build(reply)))
            .await
            .map_err(|_| PeripheralError::Unavailable)?;
        response.await.map_err(|_| PeripheralError::Unavailable)?
    }

    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    pub async fn status(&self) -> Result<PeripheralStatus, PeripheralError> {
        self.call(|reply| Command::Status { reply }).await
    }

    /// Register a service and publish it to the host stack.
    ///
    /// # Errors
    ///
    /// Returns a registry error for duplicates or adapter refusal.
    #[tracing::instrument(skip(self))]
    pub async fn add_service(
        &self,
        uuid: AttributeUuid,
        is_primary: bool,
    ) -> Result<(), PeripheralError> {
        self.call(|reply| Command::AddService {
            uuid,
            is_primary,
            reply,
        })
        .await
    }

    /// Attach a characteristic to an existing service and republish.
    ///
    /// # Errors
    ///
    /// Returns a registry error when the service is unknown, the UUID is
    /// taken, or the adapter refuses the new topology.
    #[tracing::instrument(skip(self, characteristic), fields(uuid = %characteristic.uuid))]
    pub async fn add_characteristic(
        &self,
        characteristic: Characteristic,
    ) -> Result<(), PeripheralError> {
        self.call(|reply| Command::AddCharacteristic {
            characteristic,
            reply,
        })
        .await
    }

    /// Services in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    pub async fn list_services(&self) -> Result<Vec<Service>, PeripheralError> {
        self.call(|reply| Command::ListServices { reply }).await
    }

    /// Characteristics in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    pub async fn list_characteristics(&self) -> Result<Vec<CharacteristicInfo>, PeripheralError> {
        self.call(|reply| Command::ListCharacteristics { reply })
            .await
    }

    /// Start advertising. Without `service_uuids`, every registered primary
    /// service is advertised.
    ///
    /// Success means the request was issued; the host stack's verdict shows
    /// up later in [`status`](Self::status).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyLocalName`] for a blank name, or an
    /// advertising error if the radio is not powered on or refuses.
    #[tracing::instrument(skip(self, service_uuids))]
    pub async fn start_advertising(
        &self,
        local_name: &str,
        service_uuids: Option<Vec<AttributeUuid>>,
    ) -> Result<(), PeripheralError> {
        let local_name = local_name.trim();
        if local_name.is_empty() {
            return Err(ValidationError::EmptyLocalName.into());
        }
        let local_name = local_name.to_string();
        self.call(|reply| Command::StartAdvertising {
            local_name,
            service_uuids,
            reply,
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    #[tracing::instrument(skip(self))]
    pub async fn stop_advertising(&self) -> Result<(), PeripheralError> {
        self.call(|reply| Command::StopAdvertising { reply }).await
    }

    /// Store a characteristic value and notify subscribers (or only `target`).
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::CharacteristicNotFound`](perihub_domain::error::ValueError)
    /// if the characteristic is not registered under `service_uuid`.
    #[tracing::instrument(skip(self, value), fields(len = value.len()))]
    pub async fn update_value(
        &self,
        service_uuid: AttributeUuid,
        characteristic_uuid: AttributeUuid,
        value: Vec<u8>,
        target: Option<CentralId>,
    ) -> Result<Delivery, PeripheralError> {
        self.call(|reply| Command::UpdateValue {
            service_uuid,
            characteristic_uuid,
            value,
            target,
            reply,
        })
        .await
    }

    /// Current value, `None` if never written.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::CharacteristicNotFound`](perihub_domain::error::ValueError)
    /// if the characteristic is not registered under `service_uuid`.
    pub async fn get_value(
        &self,
        service_uuid: AttributeUuid,
        characteristic_uuid: AttributeUuid,
    ) -> Result<Option<Vec<u8>>, PeripheralError> {
        self.call(|reply| Command::GetValue {
            service_uuid,
            characteristic_uuid,
            reply,
        })
        .await
    }

    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    pub async fn list_devices(&self) -> Result<Vec<ConnectedDevice>, PeripheralError> {
        self.call(|reply| Command::ListDevices { reply }).await
    }
}

/// Owner of the registry, value store, state machine and radio.
pub struct EventRouter<R, P> {
    registry: GattRegistry,
    values: ValueStore,
    machine: PeripheralStateMachine,
    devices: DeviceTracker,
    radio: R,
    publisher: P,
}

// Borrows only the publisher so router futures stay `Send` without `R: Sync`.
async fn emit<P: EventPublisher>(publisher: &P, kind: EventKind) {
    publisher.publish(Event::new(kind)).await;
}

impl<R, P> EventRouter<R, P>
where
    R: RadioAdapter,
    P: EventPublisher + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(radio: R, publisher: P) -> Self {
        Self {
            registry: GattRegistry::new(),
            values: ValueStore::new(),
            machine: PeripheralStateMachine::new(),
            devices: DeviceTracker::new(),
            radio,
            publisher,
        }
    }

    /// Run the router on its own task until every handle and sink is gone.
    pub fn spawn(self, mailbox: Mailbox) -> JoinHandle<()> {
        tokio::spawn(self.run(mailbox))
    }

    async fn run(mut self, mut mailbox: Mailbox) {
        while let Some(message) = mailbox.receiver.recv().await {
            match message {
                Message::Command(command) => self.handle_command(command).await,
                Message::Radio(event) => self.handle_radio_event(event).await,
            }
        }
        tracing::info!("event router stopped");
    }

    // A dropped reply receiver means the caller gave up; nothing to do.
    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Status { reply } => {
                let _ = reply.send(Ok(self.status()));
            }
            Command::AddService {
                uuid,
                is_primary,
                reply,
            } => {
                let result = self
                    .registry
                    .add_service(uuid.clone(), is_primary, &mut self.radio);
                match &result {
                    Ok(()) => tracing::info!(%uuid, is_primary, "service added"),
                    Err(err) => tracing::warn!(%uuid, error = %err, "service not added"),
                }
                let _ = reply.send(result.map_err(Into::into));
            }
            Command::AddCharacteristic {
                characteristic,
                reply,
            } => {
                let uuid = characteristic.uuid.clone();
                let service = characteristic.service_uuid.clone();
                let result = self
                    .registry
                    .add_characteristic(characteristic, &mut self.radio);
                match &result {
                    Ok(()) => tracing::info!(%uuid, %service, "characteristic added"),
                    Err(err) => {
                        tracing::warn!(%uuid, %service, error = %err, "characteristic not added");
                    }
                }
                let _ = reply.send(result.map_err(Into::into));
            }
            Command::ListServices { reply } => {
                let _ = reply.send(Ok(self.registry.services().to_vec()));
            }
            Command::ListCharacteristics { reply } => {
                let infos = self
                    .registry
                    .characteristics()
                    .map(|c| CharacteristicInfo {
                        characteristic: c.clone(),
                        has_value: self.values.get_value(&c.uuid).is_some(),
                        subscribers: self.values.subscriber_count(&c.uuid),
                    })
                    .collect();
                let _ = reply.send(Ok(infos));
            }
            Command::StartAdvertising {
                local_name,
                service_uuids,
                reply,
            } => {
                let uuids = service_uuids.unwrap_or_else(|| {
                    self.registry
                        .services()
                        .iter()
                        .filter(|s| s.is_primary)
                        .map(|s| s.uuid.clone())
                        .collect()
                });
                let result = self
                    .machine
                    .start_advertising(&local_name, &uuids, &mut self.radio);
                match &result {
                    Ok(()) => {
                        tracing::info!(%local_name, services = uuids.len(), "advertising requested");
                        emit(&self.publisher, EventKind::AdvertisingChanged {
                            status: AdvertisingStatus::Requested,
                            error: None,
                        })
                        .await;
                    }
                    Err(err) => tracing::warn!(error = %err, "advertising not started"),
                }
                let _ = reply.send(result.map_err(Into::into));
            }
            Command::StopAdvertising { reply } => {
                self.machine.stop_advertising(&mut self.radio);
                tracing::info!("advertising stopped");
                emit(&self.publisher, EventKind::AdvertisingChanged {
                    status: AdvertisingStatus::Stopped,
                    error: None,
                })
                .await;
                let _ = reply.send(Ok(()));
            }
            Command::UpdateValue {
                service_uuid,
                characteristic_uuid,
                value,
                target,
                reply,
            } => {
                let result = self.values.update_value(
                    &self.registry,
                    &service_uuid,
                    &characteristic_uuid,
                    value,
                    target,
                    &mut self.radio,
                );
                if let Ok(delivery) = &result {
                    tracing::debug!(
                        characteristic = %characteristic_uuid,
                        notified = delivery.notified,
                        subscribers = delivery.subscribers,
                        parked = delivery.parked,
                        "value updated"
                    );
                }
                let _ = reply.send(result.map_err(Into::into));
            }
            Command::GetValue {
                service_uuid,
                characteristic_uuid,
                reply,
            } => {
                let result =
                    ValueStore::resolve(&self.registry, &service_uuid, &characteristic_uuid)
                        .map(|c| self.values.get_value(&c.uuid).map(<[u8]>::to_vec))
                        .map_err(Into::into);
                let _ = reply.send(result);
            }
            Command::ListDevices { reply } => {
                let _ = reply.send(Ok(self.connected_devices()));
            }
        }
    }

    async fn handle_radio_event(&mut self, event: RadioEvent) {
        match event {
            RadioEvent::PowerStateChanged(state) => {
                let transition = self.machine.apply_power_state(state);
                tracing::info!(from = %transition.previous, to = %transition.current, "radio power state changed");
                emit(&self.publisher, EventKind::PowerStateChanged { state }).await;
                if transition.advertising_cleared {
                    self.radio.stop_advertising();
                    emit(&self.publisher, EventKind::AdvertisingChanged {
                        status: AdvertisingStatus::Stopped,
                        error: None,
                    })
                    .await;
                }
            }
            RadioEvent::AdvertisingStarted => {
                if self.machine.advertising_started() {
                    tracing::info!("advertising confirmed by host stack");
                    emit(&self.publisher, EventKind::AdvertisingChanged {
                        status: AdvertisingStatus::Active,
                        error: None,
                    })
                    .await;
                } else {
                    tracing::debug!("ignoring stale advertising acknowledgment");
                }
            }
            RadioEvent::AdvertisingFailed { reason } => {
                tracing::warn!(%reason, "advertising failed");
                self.machine.advertising_failed(reason.clone());
                emit(&self.publisher, EventKind::AdvertisingChanged {
                    status: AdvertisingStatus::Stopped,
                    error: Some(reason),
                })
                .await;
            }
            RadioEvent::ServiceAdded { uuid } => {
                tracing::debug!(%uuid, "service live on host stack");
            }
            RadioEvent::ServiceAddFailed { uuid, reason } => {
                tracing::warn!(%uuid, %reason, "host stack failed to add service");
                self.machine
                    .record_error(format!("failed to add service {uuid}: {reason}"));
            }
            RadioEvent::CentralSubscribed {
                central,
                characteristic,
                name,
            } => self.on_subscribed(central, characteristic, name).await,
            RadioEvent::CentralUnsubscribed {
                central,
                characteristic,
            } => {
                self.values.remove_subscription(&central, &characteristic);
                self.devices.touch(&central, now());
                tracing::debug!(%central, %characteristic, "central unsubscribed");
                self.forget_if_idle(&central).await;
            }
            RadioEvent::CentralDisconnected { central } => {
                self.values.remove_central(&central);
                tracing::debug!(%central, "central disconnected");
                self.forget_if_idle(&central).await;
            }
            RadioEvent::ReadRequested {
                request,
                central,
                characteristic,
            } => {
                if let Some(central) = &central {
                    self.devices.touch(central, now());
                }
                let outcome = self.values.respond_to_read(&self.registry, &characteristic);
                tracing::debug!(%request, %characteristic, status = ?outcome.status(), "read request");
                self.radio.respond_read(request, &outcome);
            }
            RadioEvent::WriteRequested(requests) => {
                for request in requests {
                    self.on_write(request).await;
                }
            }
            RadioEvent::ReadyToResume => {
                let delivered = self.values.resume_parked(&mut self.radio);
                tracing::debug!(
                    delivered,
                    still_parked = self.values.parked_count(),
                    "host stack ready to resume notifications"
                );
            }
        }
    }

    async fn on_subscribed(
        &mut self,
        central: CentralId,
        characteristic: AttributeUuid,
        name: Option<String>,
    ) {
        match self.registry.characteristic(&characteristic) {
            None => {
                tracing::warn!(%central, %characteristic, "subscription to unknown characteristic ignored");
                return;
            }
            Some(c) if !c.is_subscribable() => {
                tracing::warn!(%central, %characteristic, "subscription to characteristic without notify or indicate ignored");
                return;
            }
            Some(_) => {}
        }
        self.values
            .record_subscription(central.clone(), characteristic.clone());
        tracing::debug!(%central, %characteristic, "central subscribed");
        if self.devices.upsert(central.clone(), name.clone(), now()) {
            tracing::info!(%central, "device connected");
            emit(&self.publisher, EventKind::DeviceConnected {
                identifier: central,
                name,
            })
            .await;
        }
    }

    async fn forget_if_idle(&mut self, central: &CentralId) {
        if self.values.has_subscriptions(central) {
            return;
        }
        if self.devices.remove(central).is_some() {
            tracing::info!(%central, "device disconnected");
            emit(&self.publisher, EventKind::DeviceDisconnected {
                identifier: central.clone(),
            })
            .await;
        }
    }

    // Each write in a batch stands alone; one refusal does not abort the rest.
    async fn on_write(&mut self, write: WriteRequest) {
        if let Some(central) = &write.central {
            self.devices.touch(central, now());
        }
        let outcome =
            self.values
                .respond_to_write(&self.registry, &write.characteristic, &write.value);
        tracing::debug!(
            request = %write.request,
            characteristic = %write.characteristic,
            status = ?outcome.status(),
            "write request"
        );
        self.radio.respond_write(write.request, outcome);

        let service_uuid = self
            .registry
            .characteristic(&write.characteristic)
            .map(|c| c.service_uuid.clone());
        if let (WriteOutcome::Accepted, Some(service_uuid)) =
            (outcome, service_uuid)
        {
            emit(&self.publisher, EventKind::DataReceived {
                service_uuid,
                characteristic_uuid: write.characteristic,
                central: write.central,
                value: write.value,
            })
            .await;
        }
    }

    fn status(&self) -> PeripheralStatus {
        let advertising = self.machine.advertising();
        PeripheralStatus {
            state: self.machine.state(),
            advertising: advertising.is_advertising(),
            advertising_status: advertising,
            local_name: self.machine.local_name().map(str::to_string),
            connected_devices: self.devices.len(),
            services: self.registry.service_count(),
            characteristics: self.registry.characteristic_count(),
            last_error: self.machine.last_error().map(str::to_string),
        }
    }

    fn connected_devices(&self) -> Vec<ConnectedDevice> {
        self.devices
            .records()
            .iter()
            .map(|record| {
                let mut device = ConnectedDevice::new(
                    record.identifier.clone(),
                    record.name.clone(),
                    record.last_seen,
                );
                device.subscriptions = self.values.subscriptions_of(
                    &record.identifier,
                    self.registry.characteristics().map(|c| &c.uuid),
                );
                device
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use perihub_domain::att::ReadOutcome;
    use perihub_domain::characteristic::{Permission, PermissionSet, Property, PropertySet};
    use perihub_domain::error::{AdvertisingError, RegistryError, ValueError};
    use perihub_domain::id::RequestId;
    use perihub_domain::peripheral::PeripheralState;
    use tokio::sync::broadcast;

    use super::*;
    use crate::event_bus::InProcessEventBus;
    use crate::testing::{SharedRadio, uuid};

    struct Harness {
        handle: PeripheralHandle,
        sink: RadioEventSink,
        radio: SharedRadio,
        events: broadcast::Receiver<Event>,
    }

    fn start() -> Harness {
        let radio = SharedRadio::new();
        let bus = Arc::new(InProcessEventBus::new(64));
        let events = bus.subscribe();
        let (handle, mailbox) = PeripheralHandle::channel(16);
        let sink = handle.radio_sink();
        EventRouter::new(radio.clone(), bus).spawn(mailbox);
        Harness {
            handle,
            sink,
            radio,
            events,
        }
    }

    fn heart_rate_measurement() -> Characteristic {
        Characteristic::builder(uuid("2A37"), uuid("180D"))
            .properties(PropertySet::empty().with(Property::Notify))
            .permissions(PermissionSet::empty().with(Permission::Readable))
            .build()
    }

    async fn with_heart_rate(harness: &Harness) {
        harness.handle.add_service(uuid("180D"), true).await.unwrap();
        harness
            .handle
            .add_characteristic(heart_rate_measurement())
            .await
            .unwrap();
    }

    async fn power_on(harness: &Harness) {
        harness
            .sink
            .send(RadioEvent::PowerStateChanged(PeripheralState::PoweredOn))
            .await
            .unwrap();
    }

    fn drain(events: &mut broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut kinds = Vec::new();
        while let Ok(event) = events.try_recv() {
            kinds.push(event.kind);
        }
        kinds
    }

    #[tokio::test]
    async fn should_report_initial_status() {
        let harness = start();

        let status = harness.handle.status().await.unwrap();

        assert_eq!(status.state, PeripheralState::Unknown);
        assert!(!status.advertising);
        assert_eq!(status.connected_devices, 0);
        assert_eq!(status.services, 0);
    }

    #[tokio::test]
    async fn should_treat_32_bit_form_as_same_service() {
        let harness = start();
        harness.handle.add_service(uuid("180D"), true).await.unwrap();

        let err = harness
            .handle
            .add_service(uuid("0000180D"), true)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PeripheralError::Registry(RegistryError::DuplicateService { .. })
        ));
        assert_eq!(harness.handle.list_services().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_list_registered_topology() {
        let harness = start();
        with_heart_rate(&harness).await;

        let services = harness.handle.list_services().await.unwrap();
        let characteristics = harness.handle.list_characteristics().await.unwrap();

        assert_eq!(services.len(), 1);
        assert_eq!(services[0].characteristics, vec![uuid("2A37")]);
        assert_eq!(characteristics.len(), 1);
        assert!(!characteristics[0].has_value);
        assert_eq!(harness.radio.inspect(|r| r.published.len()), 2);
    }

    #[tokio::test]
    async fn should_track_subscribe_then_unsubscribe() {
        let mut harness = start();
        with_heart_rate(&harness).await;

        harness
            .sink
            .send(RadioEvent::CentralSubscribed {
                central: CentralId::from("ABC"),
                characteristic: uuid("2A37"),
                name: Some("Watch".to_string()),
            })
            .await
            .unwrap();
        let devices = harness.handle.list_devices().await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].identifier, CentralId::from("ABC"));
        assert_eq!(devices[0].name.as_deref(), Some("Watch"));
        assert_eq!(devices[0].subscriptions, vec![uuid("2A37")]);
        assert_eq!(harness.handle.status().await.unwrap().connected_devices, 1);

        harness
            .sink
            .send(RadioEvent::CentralUnsubscribed {
                central: CentralId::from("ABC"),
                characteristic: uuid("2A37"),
            })
            .await
            .unwrap();
        assert!(harness.handle.list_devices().await.unwrap().is_empty());

        let kinds = drain(&mut harness.events);
        assert!(matches!(&kinds[0], EventKind::DeviceConnected { identifier, .. } if identifier.as_str() == "ABC"));
        assert!(matches!(&kinds[1], EventKind::DeviceDisconnected { identifier } if identifier.as_str() == "ABC"));
    }

    #[tokio::test]
    async fn should_ignore_subscription_to_unknown_characteristic() {
        let mut harness = start();
        with_heart_rate(&harness).await;

        harness
            .sink
            .send(RadioEvent::CentralSubscribed {
                central: CentralId::from("ABC"),
                characteristic: uuid("FFFF"),
                name: None,
            })
            .await
            .unwrap();

        assert!(harness.handle.list_devices().await.unwrap().is_empty());
        assert!(drain(&mut harness.events).is_empty());
    }

    #[tokio::test]
    async fn should_ignore_subscription_to_characteristic_without_notify() {
        let mut harness = start();
        with_heart_rate(&harness).await;
        harness
            .handle
            .add_characteristic(
                Characteristic::builder(uuid("2A38"), uuid("180D"))
                    .properties(PropertySet::empty().with(Property::Read))
                    .permissions(PermissionSet::empty().with(Permission::Readable))
                    .build(),
            )
            .await
            .unwrap();
        drain(&mut harness.events);

        harness
            .sink
            .send(RadioEvent::CentralSubscribed {
                central: CentralId::from("ABC"),
                characteristic: uuid("2A38"),
                name: None,
            })
            .await
            .unwrap();

        assert!(harness.handle.list_devices().await.unwrap().is_empty());
        let infos = harness.handle.list_characteristics().await.unwrap();
        let location = infos
            .iter()
            .find(|i| i.characteristic.uuid == uuid("2A38"))
            .unwrap();
        assert_eq!(location.subscribers, 0);
        assert!(drain(&mut harness.events).is_empty());
    }

    #[tokio::test]
    async fn should_drop_every_subscription_on_disconnect() {
        let mut harness = start();
        with_heart_rate(&harness).await;
        harness
            .sink
            .send(RadioEvent::CentralSubscribed {
                central: CentralId::from("ABC"),
                characteristic: uuid("2A37"),
                name: None,
            })
            .await
            .unwrap();

        harness
            .sink
            .send(RadioEvent::CentralDisconnected {
                central: CentralId::from("ABC"),
            })
            .await
            .unwrap();

        assert!(harness.handle.list_devices().await.unwrap().is_empty());
        let infos = harness.handle.list_characteristics().await.unwrap();
        assert_eq!(infos[0].subscribers, 0);
        assert!(
            drain(&mut harness.events)
                .iter()
                .any(|k| matches!(k, EventKind::DeviceDisconnected { .. }))
        );
    }

    #[tokio::test]
    async fn should_refuse_write_to_notify_only_characteristic() {
        let mut harness = start();
        with_heart_rate(&harness).await;
        harness
            .handle
            .update_value(uuid("180D"), uuid("2A37"), vec![0x00, 0x48], None)
            .await
            .unwrap();

        harness
            .sink
            .send(RadioEvent::WriteRequested(vec![WriteRequest {
                request: RequestId(1),
                central: Some(CentralId::from("ABC")),
                characteristic: uuid("2A37"),
                value: vec![0xFF],
            }]))
            .await
            .unwrap();

        let value = harness
            .handle
            .get_value(uuid("180D"), uuid("2A37"))
            .await
            .unwrap();
        assert_eq!(value, Some(vec![0x00, 0x48]));
        assert_eq!(
            harness.radio.inspect(|r| r.writes.clone()),
            vec![(RequestId(1), WriteOutcome::NotWriteable)]
        );
        assert!(
            !drain(&mut harness.events)
                .iter()
                .any(|k| matches!(k, EventKind::DataReceived { .. }))
        );
    }

    #[tokio::test]
    async fn should_answer_each_write_in_a_batch() {
        let mut harness = start();
        harness.handle.add_service(uuid("180D"), true).await.unwrap();
        harness
            .handle
            .add_characteristic(heart_rate_measurement())
            .await
            .unwrap();
        harness
            .handle
            .add_characteristic(
                Characteristic::builder(uuid("2A39"), uuid("180D"))
                    .properties(PropertySet::empty().with(Property::Write))
                    .permissions(PermissionSet::empty().with(Permission::Writeable))
                    .build(),
            )
            .await
            .unwrap();

        harness
            .sink
            .send(RadioEvent::WriteRequested(vec![
                WriteRequest {
                    request: RequestId(1),
                    central: None,
                    characteristic: uuid("2A37"),
                    value: vec![0x01],
                },
                WriteRequest {
                    request: RequestId(2),
                    central: None,
                    characteristic: uuid("2A39"),
                    value: vec![0x01],
                },
                WriteRequest {
                    request: RequestId(3),
                    central: None,
                    characteristic: uuid("AAAA"),
                    value: vec![0x01],
                },
            ]))
            .await
            .unwrap();
        let value = harness
            .handle
            .get_value(uuid("180D"), uuid("2A39"))
            .await
            .unwrap();

        assert_eq!(value, Some(vec![0x01]));
        assert_eq!(
            harness.radio.inspect(|r| r.writes.clone()),
            vec![
                (RequestId(1), WriteOutcome::NotWriteable),
                (RequestId(2), WriteOutcome::Accepted),
                (RequestId(3), WriteOutcome::AttributeNotFound),
            ]
        );
        let received: Vec<_> = drain(&mut harness.events)
            .into_iter()
            .filter(|k| matches!(k, EventKind::DataReceived { .. }))
            .collect();
        assert_eq!(
            received,
            vec![EventKind::DataReceived {
                service_uuid: uuid("180D"),
                characteristic_uuid: uuid("2A39"),
                central: None,
                value: vec![0x01],
            }]
        );
    }

    #[tokio::test]
    async fn should_answer_read_requests() {
        let harness = start();
        harness.handle.add_service(uuid("180D"), true).await.unwrap();
        harness
            .handle
            .add_characteristic(
                Characteristic::builder(uuid("2A38"), uuid("180D"))
                    .properties(PropertySet::empty().with(Property::Read))
                    .permissions(PermissionSet::empty().with(Permission::Readable))
                    .build(),
            )
            .await
            .unwrap();
        harness
            .handle
            .update_value(uuid("180D"), uuid("2A38"), vec![0x01], None)
            .await
            .unwrap();

        for (id, characteristic) in [(1, "2A38"), (2, "FFFF")] {
            harness
                .sink
                .send(RadioEvent::ReadRequested {
                    request: RequestId(id),
                    central: None,
                    characteristic: uuid(characteristic),
                })
                .await
                .unwrap();
        }
        harness.handle.status().await.unwrap();

        assert_eq!(
            harness.radio.inspect(|r| r.reads.clone()),
            vec![
                (RequestId(1), ReadOutcome::Found(vec![0x01])),
                (RequestId(2), ReadOutcome::AttributeNotFound),
            ]
        );
    }

    #[tokio::test]
    async fn should_clear_advertising_when_radio_powers_off() {
        let harness = start();
        power_on(&harness).await;
        harness.handle.start_advertising("hub", None).await.unwrap();
        assert!(harness.handle.status().await.unwrap().advertising);

        harness
            .sink
            .send(RadioEvent::PowerStateChanged(PeripheralState::PoweredOff))
            .await
            .unwrap();
        let status = harness.handle.status().await.unwrap();
        assert!(!status.advertising);
        assert_eq!(status.state, PeripheralState::PoweredOff);
        assert_eq!(harness.radio.inspect(|r| r.stops), 1);

        let err = harness
            .handle
            .start_advertising("hub", None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PeripheralError::Advertising(AdvertisingError::RadioNotReady {
                state: PeripheralState::PoweredOff
            })
        ));

        power_on(&harness).await;
        harness.handle.start_advertising("hub", None).await.unwrap();
    }

    #[tokio::test]
    async fn should_advertise_primary_services_by_default() {
        let harness = start();
        harness.handle.add_service(uuid("180D"), true).await.unwrap();
        harness.handle.add_service(uuid("180F"), false).await.unwrap();
        power_on(&harness).await;

        harness.handle.start_advertising("hub", None).await.unwrap();

        assert_eq!(
            harness.radio.inspect(|r| r.advertising.clone()),
            vec![("hub".to_string(), vec![uuid("180D")])]
        );
    }

    #[tokio::test]
    async fn should_confirm_advertising_on_acknowledgment() {
        let harness = start();
        power_on(&harness).await;
        harness.handle.start_advertising("hub", None).await.unwrap();
        assert_eq!(
            harness.handle.status().await.unwrap().advertising_status,
            AdvertisingStatus::Requested
        );

        harness.sink.send(RadioEvent::AdvertisingStarted).await.unwrap();

        let status = harness.handle.status().await.unwrap();
        assert_eq!(status.advertising_status, AdvertisingStatus::Active);
        assert_eq!(status.local_name.as_deref(), Some("hub"));
    }

    #[tokio::test]
    async fn should_surface_asynchronous_advertising_failure() {
        let harness = start();
        power_on(&harness).await;
        harness.handle.start_advertising("hub", None).await.unwrap();

        harness
            .sink
            .send(RadioEvent::AdvertisingFailed {
                reason: "data too large".to_string(),
            })
            .await
            .unwrap();

        let status = harness.handle.status().await.unwrap();
        assert!(!status.advertising);
        assert_eq!(status.last_error.as_deref(), Some("data too large"));
    }

    #[tokio::test]
    async fn should_reject_blank_local_name() {
        let harness = start();
        power_on(&harness).await;

        let err = harness
            .handle
            .start_advertising("  ", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PeripheralError::Validation(ValidationError::EmptyLocalName)
        ));
    }

    #[tokio::test]
    async fn should_retry_parked_push_when_ready_to_resume() {
        let harness = start();
        with_heart_rate(&harness).await;
        harness
            .sink
            .send(RadioEvent::CentralSubscribed {
                central: CentralId::from("ABC"),
                characteristic: uuid("2A37"),
                name: None,
            })
            .await
            .unwrap();
        harness.radio.inspect(|r| r.push_result = false);

        let delivery = harness
            .handle
            .update_value(uuid("180D"), uuid("2A37"), vec![0x00, 0x50], None)
            .await
            .unwrap();
        assert!(delivery.parked);
        assert_eq!(delivery.subscribers, 1);

        harness.radio.inspect(|r| {
            r.push_result = true;
            r.pushes.clear();
        });
        harness.sink.send(RadioEvent::ReadyToResume).await.unwrap();
        harness.handle.status().await.unwrap();

        assert_eq!(
            harness.radio.inspect(|r| r.pushes.clone()),
            vec![(uuid("2A37"), vec![0x00, 0x50], None)]
        );
    }

    #[tokio::test]
    async fn should_reject_value_for_characteristic_of_other_service() {
        let harness = start();
        with_heart_rate(&harness).await;
        harness.handle.add_service(uuid("180F"), true).await.unwrap();

        let err = harness
            .handle
            .update_value(uuid("180F"), uuid("2A37"), vec![1], None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PeripheralError::Value(ValueError::CharacteristicNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn should_publish_power_state_changes() {
        let mut harness = start();
        power_on(&harness).await;
        harness.handle.status().await.unwrap();

        assert_eq!(
            drain(&mut harness.events),
            vec![EventKind::PowerStateChanged {
                state: PeripheralState::PoweredOn
            }]
        );
    }

    #[tokio::test]
    async fn should_report_unavailable_once_router_is_gone() {
        let (handle, mailbox) = PeripheralHandle::channel(4);
        drop(mailbox);

        let err = handle.status().await.unwrap_err();

        assert!(matches!(err, PeripheralError::Unavailable));
    }
}
