//! The "other side" of the loopback: plays the host stack's power reports
//! and the centrals' requests, and shows what the peripheral sent back.

use perihub_app::ports::{RadioEvent, WriteRequest};
use perihub_app::router::RadioEventSink;
use perihub_domain::att::{ReadOutcome, WriteOutcome};
use perihub_domain::error::PeripheralError;
use perihub_domain::id::{AttributeUuid, CentralId, RequestId};
use perihub_domain::peripheral::PeripheralState;
use perihub_domain::service::ServiceDefinition;

use crate::link::{Advertisement, Link, Notification};

/// Injects host-stack events into the peripheral.
///
/// Events go straight into the router's mailbox, so they are ordered with
/// respect to control-plane calls made by the same task.
#[derive(Debug, Clone)]
pub struct LoopbackController {
    pub(crate) link: Link,
    pub(crate) sink: RadioEventSink,
}

impl LoopbackController {
    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    pub async fn set_power(&self, state: PeripheralState) -> Result<(), PeripheralError> {
        tracing::debug!(%state, "loopback power state");
        self.sink.send(RadioEvent::PowerStateChanged(state)).await
    }

    /// A central subscribes to notifications of `characteristic`.
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    pub async fn subscribe(
        &self,
        central: CentralId,
        characteristic: AttributeUuid,
        name: Option<String>,
    ) -> Result<(), PeripheralError> {
        {
            let mut link = self.link.lock();
            let centrals = link.subscribers.entry(characteristic.clone()).or_default();
            if !centrals.contains(&central) {
                centrals.push(central.clone());
            }
        }
        self.sink
            .send(RadioEvent::CentralSubscribed {
                central,
                characteristic,
                name,
            })
            .await
    }

    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    pub async fn unsubscribe(
        &self,
        central: CentralId,
        characteristic: AttributeUuid,
    ) -> Result<(), PeripheralError> {
        if let Some(centrals) = self.link.lock().subscribers.get_mut(&characteristic) {
            centrals.retain(|c| c != &central);
        }
        self.sink
            .send(RadioEvent::CentralUnsubscribed {
                central,
                characteristic,
            })
            .await
    }

    /// The link to `central` drops.
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    pub async fn disconnect(&self, central: CentralId) -> Result<(), PeripheralError> {
        self.link
            .lock()
            .subscribers
            .values_mut()
            .for_each(|centrals| centrals.retain(|c| c != &central));
        self.sink
            .send(RadioEvent::CentralDisconnected { central })
            .await
    }

    /// A central reads `characteristic`. The answer lands in
    /// [`read_responses`](Self::read_responses).
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    pub async fn read(
        &self,
        central: Option<CentralId>,
        characteristic: AttributeUuid,
    ) -> Result<RequestId, PeripheralError> {
        let request = self.link.lock().next_request();
        self.sink
            .send(RadioEvent::ReadRequested {
                request,
                central,
                characteristic,
            })
            .await?;
        Ok(request)
    }

    /// A central sends one batch of writes. Answers land in
    /// [`write_responses`](Self::write_responses).
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    pub async fn write(
        &self,
        central: Option<CentralId>,
        writes: Vec<(AttributeUuid, Vec<u8>)>,
    ) -> Result<Vec<RequestId>, PeripheralError> {
        let requests: Vec<WriteRequest> = {
            let mut link = self.link.lock();
            writes
                .into_iter()
                .map(|(characteristic, value)| WriteRequest {
                    request: link.next_request(),
                    central: central.clone(),
                    characteristic,
                    value,
                })
                .collect()
        };
        let ids = requests.iter().map(|r| r.request).collect();
        self.sink.send(RadioEvent::WriteRequested(requests)).await?;
        Ok(ids)
    }

    /// Fill or drain the transmit queue. Draining tells the peripheral it
    /// may resume notifications.
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    pub async fn set_queue_full(&self, full: bool) -> Result<(), PeripheralError> {
        let was_full = std::mem::replace(&mut self.link.lock().queue_full, full);
        if was_full && !full {
            self.sink.send(RadioEvent::ReadyToResume).await?;
        }
        Ok(())
    }

    /// The host stack gives up on advertising after having accepted it.
    ///
    /// # Errors
    ///
    /// Returns [`PeripheralError::Unavailable`] if the router has stopped.
    pub async fn fail_advertising(&self, reason: impl Into<String>) -> Result<(), PeripheralError> {
        self.link.lock().advertisement = None;
        self.sink
            .send(RadioEvent::AdvertisingFailed {
                reason: reason.into(),
            })
            .await
    }

    /// Services as last published.
    #[must_use]
    pub fn topology(&self) -> Vec<ServiceDefinition> {
        self.link.lock().topology.clone()
    }

    #[must_use]
    pub fn advertisement(&self) -> Option<Advertisement> {
        self.link.lock().advertisement.clone()
    }

    /// Most recent notifications, oldest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.link.lock().notifications.iter().cloned().collect()
    }

    #[must_use]
    pub fn read_responses(&self) -> Vec<(RequestId, ReadOutcome)> {
        self.link.lock().reads.iter().cloned().collect()
    }

    #[must_use]
    pub fn write_responses(&self) -> Vec<(RequestId, WriteOutcome)> {
        self.link.lock().writes.iter().cloned().collect()
    }
}
