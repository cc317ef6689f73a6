//! GATT registry — the authoritative service/characteristic topology.
//!
//! The registry is the only writer of the topology. Every successful change
//! is mirrored to the host stack by republishing all services; if the stack
//! refuses, the change is undone so the registry never runs ahead of what
//! centrals can discover.

use std::collections::HashMap;

use perihub_domain::characteristic::Characteristic;
use perihub_domain::error::RegistryError;
use perihub_domain::id::AttributeUuid;
use perihub_domain::service::{Service, ServiceDefinition};

use crate::ports::RadioAdapter;

/// Services in insertion order plus a global characteristic index.
#[derive(Debug, Default)]
pub struct GattRegistry {
    services: Vec<Service>,
    characteristics: HashMap<AttributeUuid, Characteristic>,
    insertion_order: Vec<AttributeUuid>,
}

impl GattRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service and publish the updated topology.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateService`] if `uuid` is taken, or
    /// [`RegistryError::AdapterRejected`] if the host stack refuses the
    /// topology (the service is not kept).
    pub fn add_service(
        &mut self,
        uuid: AttributeUuid,
        is_primary: bool,
        radio: &mut impl RadioAdapter,
    ) -> Result<(), RegistryError> {
        if self.service(&uuid).is_some() {
            return Err(RegistryError::DuplicateService { uuid });
        }

        self.services.push(Service::new(uuid, is_primary));
        if let Err(err) = radio.publish_services(&self.topology()) {
            self.services.pop();
            return Err(RegistryError::AdapterRejected(err));
        }
        Ok(())
    }

    /// Attach a characteristic to its service and republish every service.
    ///
    /// Characteristic UUIDs are unique across all services.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ServiceNotFound`] if the owning service is
    /// unknown, [`RegistryError::DuplicateCharacteristic`] if the UUID is
    /// already registered anywhere, or [`RegistryError::AdapterRejected`]
    /// if the host stack refuses the topology (the addition is rolled back).
    pub fn add_characteristic(
        &mut self,
        characteristic: Characteristic,
        radio: &mut impl RadioAdapter,
    ) -> Result<(), RegistryError> {
        let Some(index) = self
            .services
            .iter()
            .position(|s| s.uuid == characteristic.service_uuid)
        else {
            return Err(RegistryError::ServiceNotFound {
                uuid: characteristic.service_uuid,
            });
        };
        if self.characteristics.contains_key(&characteristic.uuid) {
            return Err(RegistryError::DuplicateCharacteristic {
                uuid: characteristic.uuid,
            });
        }

        let uuid = characteristic.uuid.clone();
        self.services[index].characteristics.push(uuid.clone());
        self.characteristics.insert(uuid.clone(), characteristic);
        self.insertion_order.push(uuid.clone());

        if let Err(err) = radio.publish_services(&self.topology()) {
            self.services[index].characteristics.pop();
            self.characteristics.remove(&uuid);
            self.insertion_order.pop();
            return Err(RegistryError::AdapterRejected(err));
        }
        Ok(())
    }

    #[must_use]
    pub fn service(&self, uuid: &AttributeUuid) -> Option<&Service> {
        self.services.iter().find(|s| &s.uuid == uuid)
    }

    #[must_use]
    pub fn characteristic(&self, uuid: &AttributeUuid) -> Option<&Characteristic> {
        self.characteristics.get(uuid)
    }

    /// Services in registration order.
    #[must_use]
    pub fn services(&self) -> &[Service] {
        &self.services
    }

    #[must_use]
    pub fn service_uuids(&self) -> Vec<AttributeUuid> {
        self.services.iter().map(|s| s.uuid.clone()).collect()
    }

    /// Characteristics across all services, in insertion order.
    pub fn characteristics(&self) -> impl Iterator<Item = &Characteristic> {
        self.insertion_order
            .iter()
            .filter_map(|uuid| self.characteristics.get(uuid))
    }

    #[must_use]
    pub fn characteristic_uuids(&self) -> Vec<AttributeUuid> {
        self.characteristics().map(|c| c.uuid.clone()).collect()
    }

    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    #[must_use]
    pub fn characteristic_count(&self) -> usize {
        self.characteristics.len()
    }

    /// Full topology in the shape the host stack publishes.
    #[must_use]
    pub fn topology(&self) -> Vec<ServiceDefinition> {
        self.services
            .iter()
            .map(|s| ServiceDefinition {
                uuid: s.uuid.clone(),
                is_primary: s.is_primary,
                characteristics: s
                    .characteristics
                    .iter()
                    .filter_map(|uuid| self.characteristics.get(uuid).cloned())
                    .collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingRadio, uuid};
    use perihub_domain::characteristic::PropertySet;

    fn characteristic(c: &str, s: &str) -> Characteristic {
        Characteristic::builder(uuid(c), uuid(s)).build()
    }

    #[test]
    fn should_reject_second_add_of_same_service() {
        let mut radio = RecordingRadio::new();
        let mut registry = GattRegistry::new();

        registry.add_service(uuid("180D"), true, &mut radio).unwrap();
        let result = registry.add_service(uuid("180d"), false, &mut radio);

        assert!(matches!(
            result,
            Err(RegistryError::DuplicateService { .. })
        ));
        assert_eq!(registry.service_uuids(), vec![uuid("180D")]);
    }

    #[test]
    fn should_publish_topology_when_service_added() {
        let mut radio = RecordingRadio::new();
        let mut registry = GattRegistry::new();

        registry.add_service(uuid("180D"), true, &mut radio).unwrap();

        assert_eq!(radio.published.len(), 1);
        assert_eq!(radio.published[0][0].uuid, uuid("180D"));
        assert!(radio.published[0][0].is_primary);
    }

    #[test]
    fn should_fail_with_service_not_found_before_service_exists() {
        let mut radio = RecordingRadio::new();
        let mut registry = GattRegistry::new();

        let result = registry.add_characteristic(characteristic("2A37", "180D"), &mut radio);

        assert!(matches!(result, Err(RegistryError::ServiceNotFound { .. })));
        assert!(radio.published.is_empty());
    }

    #[test]
    fn should_reject_duplicate_characteristic_across_services() {
        let mut radio = RecordingRadio::new();
        let mut registry = GattRegistry::new();
        registry.add_service(uuid("180D"), true, &mut radio).unwrap();
        registry.add_service(uuid("180F"), true, &mut radio).unwrap();

        registry
            .add_characteristic(characteristic("2A37", "180D"), &mut radio)
            .unwrap();
        let same_service = registry.add_characteristic(characteristic("2A37", "180D"), &mut radio);
        let other_service = registry.add_characteristic(characteristic("2A37", "180F"), &mut radio);

        assert!(matches!(
            same_service,
            Err(RegistryError::DuplicateCharacteristic { .. })
        ));
        assert!(matches!(
            other_service,
            Err(RegistryError::DuplicateCharacteristic { .. })
        ));
        assert_eq!(registry.characteristic_count(), 1);
    }

    #[test]
    fn should_republish_all_services_when_characteristic_added() {
        let mut radio = RecordingRadio::new();
        let mut registry = GattRegistry::new();
        registry.add_service(uuid("180D"), true, &mut radio).unwrap();
        registry.add_service(uuid("180F"), false, &mut radio).unwrap();

        registry
            .add_characteristic(characteristic("2A19", "180F"), &mut radio)
            .unwrap();

        let last = radio.published.last().unwrap();
        assert_eq!(last.len(), 2);
        assert!(last[0].characteristics.is_empty());
        assert_eq!(last[1].characteristics[0].uuid, uuid("2A19"));
    }

    #[test]
    fn should_roll_back_characteristic_when_adapter_rejects() {
        let mut radio = RecordingRadio::new();
        let mut registry = GattRegistry::new();
        registry.add_service(uuid("180D"), true, &mut radio).unwrap();
        radio.reject_publish = Some("database locked".to_string());

        let result = registry.add_characteristic(characteristic("2A37", "180D"), &mut radio);

        assert!(matches!(result, Err(RegistryError::AdapterRejected(_))));
        assert!(registry.characteristic(&uuid("2A37")).is_none());
        assert!(registry.service(&uuid("180D")).unwrap().characteristics.is_empty());

        radio.reject_publish = None;
        registry
            .add_characteristic(characteristic("2A37", "180D"), &mut radio)
            .unwrap();
    }

    #[test]
    fn should_roll_back_service_when_adapter_rejects() {
        let mut radio = RecordingRadio::new();
        radio.reject_publish = Some("powered off".to_string());
        let mut registry = GattRegistry::new();

        let result = registry.add_service(uuid("180D"), true, &mut radio);

        assert!(matches!(result, Err(RegistryError::AdapterRejected(_))));
        assert_eq!(registry.service_count(), 0);
    }

    #[test]
    fn should_list_characteristics_in_insertion_order() {
        let mut radio = RecordingRadio::new();
        let mut registry = GattRegistry::new();
        registry.add_service(uuid("180D"), true, &mut radio).unwrap();
        for c in ["2A39", "2A37", "2A38"] {
            registry
                .add_characteristic(
                    Characteristic::builder(uuid(c), uuid("180D"))
                        .properties(PropertySet::from_tokens(["read"]))
                        .build(),
                    &mut radio,
                )
                .unwrap();
        }

        assert_eq!(
            registry.characteristic_uuids(),
            vec![uuid("2A39"), uuid("2A37"), uuid("2A38")]
        );
    }
}
