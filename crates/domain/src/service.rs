//! Service — a primary or secondary GATT service and its characteristics.

use serde::{Deserialize, Serialize};

use crate::characteristic::Characteristic;
use crate::id::AttributeUuid;

/// A registered service. Characteristics are referenced by UUID, in the
/// order they were added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub uuid: AttributeUuid,
    pub is_primary: bool,
    pub characteristics: Vec<AttributeUuid>,
}

impl Service {
    #[must_use]
    pub fn new(uuid: AttributeUuid, is_primary: bool) -> Self {
        Self {
            uuid,
            is_primary,
            characteristics: Vec::new(),
        }
    }
}

/// A service with its characteristics fully resolved — the shape the host
/// stack needs when services are (re)published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDefinition {
    pub uuid: AttributeUuid,
    pub is_primary: bool,
    pub characteristics: Vec<Characteristic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_service_without_characteristics() {
        let service = Service::new(AttributeUuid::parse("180D").unwrap(), true);
        assert!(service.is_primary);
        assert!(service.characteristics.is_empty());
    }
}
