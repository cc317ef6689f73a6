//! Bookkeeping for centrals seen through subscriptions.
//!
//! A record exists while its central holds at least one subscription; the
//! subscriptions themselves live in the value store.

use perihub_domain::id::CentralId;
use perihub_domain::time::Timestamp;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    pub identifier: CentralId,
    pub name: Option<String>,
    pub last_seen: Timestamp,
}

#[derive(Debug, Default)]
pub struct DeviceTracker {
    devices: Vec<DeviceRecord>,
}

impl DeviceTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh a record. Returns `true` if the central is new.
    ///
    /// A known name is never overwritten by `None`.
    pub fn upsert(&mut self, identifier: CentralId, name: Option<String>, at: Timestamp) -> bool {
        if let Some(record) = self.devices.iter_mut().find(|d| d.identifier == identifier) {
            record.last_seen = at;
            if name.is_some() {
                record.name = name;
            }
            return false;
        }
        self.devices.push(DeviceRecord {
            identifier,
            name,
            last_seen: at,
        });
        true
    }

    /// Refresh `last_seen` for a known central.
    pub fn touch(&mut self, identifier: &CentralId, at: Timestamp) {
        if let Some(record) = self.devices.iter_mut().find(|d| &d.identifier == identifier) {
            record.last_seen = at;
        }
    }

    /// Returns the record if one was removed.
    pub fn remove(&mut self, identifier: &CentralId) -> Option<DeviceRecord> {
        let index = self.devices.iter().position(|d| &d.identifier == identifier)?;
        Some(self.devices.remove(index))
    }

    /// Records in first-seen order.
    #[must_use]
    pub fn records(&self) -> &[DeviceRecord] {
        &self.devices
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
