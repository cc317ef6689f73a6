//! Value store — current characteristic values and who is subscribed.
//!
//! Values are keyed by characteristic UUID alone: the registry guarantees
//! global uniqueness, and operations addressed by `(service, characteristic)`
//! are checked against the registry for ownership before touching a value.

use std::collections::HashMap;

use perihub_domain::att::{ReadOutcome, WriteOutcome};
use perihub_domain::characteristic::Characteristic;
use perihub_domain::error::ValueError;
use perihub_domain::id::{AttributeUuid, CentralId};

use crate::ports::RadioAdapter;
use crate::registry::GattRegistry;

/// What happened to the notification that followed a value update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// The host stack accepted the push.
    pub notified: bool,
    /// Centrals subscribed to the characteristic at update time.
    pub subscribers: usize,
    /// The push was refused while subscribers exist and will be retried
    /// when the host stack is ready again.
    pub parked: bool,
}

#[derive(Debug, Clone)]
struct ParkedPush {
    characteristic: AttributeUuid,
    target: Option<CentralId>,
    value: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct ValueStore {
    values: HashMap<AttributeUuid, Vec<u8>>,
    subscribers: HashMap<AttributeUuid, Vec<CentralId>>,
    parked: Vec<ParkedPush>,
}

impl ValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a characteristic and check it belongs to `service_uuid`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::CharacteristicNotFound`] if the characteristic is
    /// unknown or registered under a different service.
    pub fn resolve<'r>(
        registry: &'r GattRegistry,
        service_uuid: &AttributeUuid,
        characteristic_uuid: &AttributeUuid,
    ) -> Result<&'r Characteristic, ValueError> {
        registry
            .characteristic(characteristic_uuid)
            .filter(|c| &c.service_uuid == service_uuid)
            .ok_or_else(|| ValueError::CharacteristicNotFound {
                uuid: characteristic_uuid.clone(),
            })
    }

    /// Store a new value and push it to subscribers (or only `target`).
    ///
    /// A refused push never undoes the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::CharacteristicNotFound`] if the characteristic
    /// is not registered under `service_uuid`.
    pub fn update_value(
        &mut self,
        registry: &GattRegistry,
        service_uuid: &AttributeUuid,
        characteristic_uuid: &AttributeUuid,
        value: Vec<u8>,
        target: Option<CentralId>,
        radio: &mut impl RadioAdapter,
    ) -> Result<Delivery, ValueError> {
        let characteristic = Self::resolve(registry, service_uuid, characteristic_uuid)?;
        let uuid = characteristic.uuid.clone();

        let notified = radio.push_value(&uuid, &value, target.as_ref());
        let subscribers = self.subscriber_count(&uuid);
        let reachable = match &target {
            Some(central) => self.is_subscribed(central, &uuid),
            None => subscribers > 0,
        };
        let parked = !notified && reachable;
        if parked {
            self.park(uuid.clone(), target, value.clone());
        }

        self.values.insert(uuid, value);
        Ok(Delivery {
            notified,
            subscribers,
            parked,
        })
    }

    /// Current value of a characteristic, if one was ever stored.
    #[must_use]
    pub fn get_value(&self, characteristic_uuid: &AttributeUuid) -> Option<&[u8]> {
        self.values.get(characteristic_uuid).map(Vec::as_slice)
    }

    /// Returns `true` if the subscription was not already present.
    pub fn record_subscription(
        &mut self,
        central: CentralId,
        characteristic_uuid: AttributeUuid,
    ) -> bool {
        let centrals = self.subscribers.entry(characteristic_uuid).or_default();
        if centrals.contains(&central) {
            return false;
        }
        centrals.push(central);
        true
    }

    /// Returns `true` if a subscription was removed.
    pub fn remove_subscription(
        &mut self,
        central: &CentralId,
        characteristic_uuid: &AttributeUuid,
    ) -> bool {
        let Some(centrals) = self.subscribers.get_mut(characteristic_uuid) else {
            return false;
        };
        let before = centrals.len();
        centrals.retain(|c| c != central);
        let removed = centrals.len() != before;
        if centrals.is_empty() {
            self.subscribers.remove(characteristic_uuid);
        }
        removed
    }

    /// Drop every subscription held by `central`.
    pub fn remove_central(&mut self, central: &CentralId) {
        self.subscribers.retain(|_, centrals| {
            centrals.retain(|c| c != central);
            !centrals.is_empty()
        });
        self.parked.retain(|p| p.target.as_ref() != Some(central));
    }

    #[must_use]
    pub fn subscriber_count(&self, characteristic_uuid: &AttributeUuid) -> usize {
        self.subscribers.get(characteristic_uuid).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_subscribed(&self, central: &CentralId, characteristic_uuid: &AttributeUuid) -> bool {
        self.subscribers
            .get(characteristic_uuid)
            .is_some_and(|centrals| centrals.contains(central))
    }

    /// Characteristics `central` is subscribed to, following `order`.
    #[must_use]
    pub fn subscriptions_of<'a>(
        &self,
        central: &CentralId,
        order: impl Iterator<Item = &'a AttributeUuid>,
    ) -> Vec<AttributeUuid> {
        order
            .filter(|uuid| self.is_subscribed(central, uuid))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn has_subscriptions(&self, central: &CentralId) -> bool {
        self.subscribers.values().any(|c| c.contains(central))
    }

    /// Serve a central's read.
    #[must_use]
    pub fn respond_to_read(
        &self,
        registry: &GattRegistry,
        characteristic_uuid: &AttributeUuid,
    ) -> ReadOutcome {
        let Some(characteristic) = registry.characteristic(characteristic_uuid) else {
            return ReadOutcome::AttributeNotFound;
        };
        if !characteristic.is_readable() {
            return ReadOutcome::NotReadable;
        }
        match self.values.get(characteristic_uuid) {
            Some(value) => ReadOutcome::Found(value.clone()),
            None => ReadOutcome::AttributeNotFound,
        }
    }

    /// Serve a central's write, storing the value when permitted.
    pub fn respond_to_write(
        &mut self,
        registry: &GattRegistry,
        characteristic_uuid: &AttributeUuid,
        value: &[u8],
    ) -> WriteOutcome {
        let Some(characteristic) = registry.characteristic(characteristic_uuid) else {
            return WriteOutcome::AttributeNotFound;
        };
        if !characteristic.is_writeable() {
            return WriteOutcome::NotWriteable;
        }
        self.values
            .insert(characteristic_uuid.clone(), value.to_vec());
        WriteOutcome::Accepted
    }

    /// Retry parked pushes in the order they were parked.
    ///
    /// Returns how many went through; the rest stay parked.
    pub fn resume_parked(&mut self, radio: &mut impl RadioAdapter) -> usize {
        let pending = std::mem::take(&mut self.parked);
        let mut delivered = 0;
        for push in pending {
            if radio.push_value(&push.characteristic, &push.value, push.target.as_ref()) {
                delivered += 1;
            } else {
                self.parked.push(push);
            }
        }
        delivered
    }

    #[must_use]
    pub fn parked_count(&self) -> usize {
        self.parked.len()
    }

    /// Only the latest value per characteristic and target is worth sending.
    fn park(&mut self, characteristic: AttributeUuid, target: Option<CentralId>, value: Vec<u8>) {
        self.parked
            .retain(|p| !(p.characteristic == characteristic && p.target == target));
        self.parked.push(ParkedPush {
            characteristic,
            target,
            value,
        });
    }
}
