//! The [`RadioAdapter`] half of the loopback.

use tokio::sync::mpsc;

use perihub_app::ports::{RadioAdapter, RadioEvent};
use perihub_domain::att::{ReadOutcome, WriteOutcome};
use perihub_domain::error::AdapterError;
use perihub_domain::id::{AttributeUuid, CentralId, RequestId};
use perihub_domain::service::ServiceDefinition;

use crate::config::LoopbackConfig;
use crate::link::{Advertisement, Link, Notification, record};

/// Simulated host stack driven by the event router.
///
/// Host-stack acknowledgments are queued and forwarded to the router
/// asynchronously, the way a real stack calls back after the command
/// returned.
pub struct LoopbackRadio {
    pub(crate) config: LoopbackConfig,
    pub(crate) link: Link,
    pub(crate) events: mpsc::UnboundedSender<RadioEvent>,
}

impl LoopbackRadio {
    fn emit(&self, event: RadioEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("loopback forwarder stopped, dropping radio event");
        }
    }
}

impl RadioAdapter for LoopbackRadio {
    fn publish_services(&mut self, topology: &[ServiceDefinition]) -> Result<(), AdapterError> {
        self.link.lock().topology = topology.to_vec();
        for service in topology {
            self.emit(RadioEvent::ServiceAdded {
                uuid: service.uuid.clone(),
            });
        }
        Ok(())
    }

    fn start_advertising(
        &mut self,
        local_name: &str,
        service_uuids: &[AttributeUuid],
    ) -> Result<(), AdapterError> {
        self.link.lock().advertisement = Some(Advertisement {
            local_name: local_name.to_string(),
            service_uuids: service_uuids.to_vec(),
        });
        self.emit(RadioEvent::AdvertisingStarted);
        Ok(())
    }

    fn stop_advertising(&mut self) {
        self.link.lock().advertisement = None;
    }

    fn push_value(
        &mut self,
        characteristic: &AttributeUuid,
        value: &[u8],
        target: Option<&CentralId>,
    ) -> bool {
        let mut link = self.link.lock();
        if link.queue_full {
            tracing::debug!(%characteristic, "transmit queue full");
            return false;
        }
        if value.len() > self.config.max_payload {
            tracing::debug!(
                %characteristic,
                len = value.len(),
                max = self.config.max_payload,
                "payload exceeds link limit"
            );
            return false;
        }
        let recipients = link.recipients(characteristic, target);
        if recipients.is_empty() {
            return false;
        }
        let cap = link.history;
        record(
            &mut link.notifications,
            cap,
            Notification {
                characteristic: characteristic.clone(),
                value: value.to_vec(),
                recipients,
            },
        );
        true
    }

    fn respond_read(&mut self, request: RequestId, outcome: &ReadOutcome) {
        let mut link = self.link.lock();
        let cap = link.history;
        record(&mut link.reads, cap, (request, outcome.clone()));
    }

    fn respond_write(&mut self, request: RequestId, outcome: WriteOutcome) {
        let mut link = self.link.lock();
        let cap = link.history;
        record(&mut link.writes, cap, (request, outcome));
    }
}
