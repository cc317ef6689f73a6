//! Recording radio used by unit tests.

use perihub_domain::att::{ReadOutcome, WriteOutcome};
use perihub_domain::error::AdapterError;
use perihub_domain::id::{AttributeUuid, CentralId, RequestId};
use perihub_domain::service::ServiceDefinition;

use crate::ports::RadioAdapter;

#[derive(Debug, Default)]
pub struct RecordingRadio {
    pub published: Vec<Vec<ServiceDefinition>>,
    pub reject_publish: Option<String>,
    pub advertising: Vec<(String, Vec<AttributeUuid>)>,
    pub reject_advertising: Option<String>,
    pub stops: usize,
    pub pushes: Vec<(AttributeUuid, Vec<u8>, Option<CentralId>)>,
    pub push_result: bool,
    pub reads: Vec<(RequestId, ReadOutcome)>,
    pub writes: Vec<(RequestId, WriteOutcome)>,
}

impl RecordingRadio {
    pub fn new() -> Self {
        Self {
            push_result: true,
            ..Self::default()
        }
    }
}

impl RadioAdapter for RecordingRadio {
    fn publish_services(&mut self, topology: &[ServiceDefinition]) -> Result<(), AdapterError> {
        if let Some(reason) = &self.reject_publish {
            return Err(AdapterError::new(reason.clone()));
        }
        self.published.push(topology.to_vec());
        Ok(())
    }

    fn start_advertising(
        &mut self,
        local_name: &str,
        service_uuids: &[AttributeUuid],
    ) -> Result<(), AdapterError> {
        if let Some(reason) = &self.reject_advertising {
            return Err(AdapterError::new(reason.clone()));
        }
        self.advertising
            .push((local_name.to_string(), service_uuids.to_vec()));
        Ok(())
    }

    fn stop_advertising(&mut self) {
        self.stops += 1;
    }

    fn push_value(
        &mut self,
        characteristic: &AttributeUuid,
        value: &[u8],
        target: Option<&CentralId>,
    ) -> bool {
        self.pushes
            .push((characteristic.clone(), value.to_vec(), target.cloned()));
        self.push_result
    }

    fn respond_read(&mut self, request: RequestId, outcome: &ReadOutcome) {
        self.reads.push((request, outcome.clone()));
    }

    fn respond_write(&mut self, request: RequestId, outcome: WriteOutcome) {
        self.writes.push((request, outcome));
    }
}

pub fn uuid(s: &str) -> AttributeUuid {
    AttributeUuid::parse(s).unwrap()
}

/// Lets a test keep inspecting the radio after the router takes ownership.
#[derive(Debug, Clone)]
pub struct SharedRadio(pub std::sync::Arc<std::sync::Mutex<RecordingRadio>>);

impl SharedRadio {
    pub fn new() -> Self {
        Self(std::sync::Arc::new(std::sync::Mutex::new(RecordingRadio::new())))
    }

    pub fn inspect<T>(&self, f: impl FnOnce(&mut RecordingRadio) -> T) -> T {
        f(&mut self.0.lock().unwrap())
    }
}

impl RadioAdapter for SharedRadio {
    fn publish_services(&mut self, topology: &[ServiceDefinition]) -> Result<(), AdapterError> {
        self.inspect(|r| r.publish_services(topology))
    }

    fn start_advertising(
        &mut self,
        local_name: &str,
        service_uuids: &[AttributeUuid],
    ) -> Result<(), AdapterError> {
        self.inspect(|r| r.start_advertising(local_name, service_uuids))
    }

    fn stop_advertising(&mut self) {
        self.inspect(RecordingRadio::stop_advertising);
    }

    fn push_value(
        &mut self,
        characteristic: &AttributeUuid,
        value: &[u8],
        target: Option<&CentralId>,
    ) -> bool {
        self.inspect(|r| r.push_value(characteristic, value, target))
    }

    fn respond_read(&mut self, request: RequestId, outcome: &ReadOutcome) {
        self.inspect(|r| r.respond_read(request, outcome));
    }

    fn respond_write(&mut self, request: RequestId, outcome: WriteOutcome) {
        self.inspect(|r| r.respond_write(request, outcome));
    }
}
