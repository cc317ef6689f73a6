//! Connected device — a central observed through its subscriptions.

use serde::{Deserialize, Serialize};

use crate::id::{AttributeUuid, CentralId};
use crate::time::Timestamp;

/// A central currently subscribed to at least one characteristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedDevice {
    pub identifier: CentralId,
    /// Display name, when the host stack reports one.
    pub name: Option<String>,
    pub connected: bool,
    pub last_seen: Timestamp,
    /// Characteristics the central is subscribed to, in subscription order.
    pub subscriptions: Vec<AttributeUuid>,
}

impl ConnectedDevice {
    #[must_use]
    pub fn new(identifier: CentralId, name: Option<String>, seen_at: Timestamp) -> Self {
        Self {
            identifier,
            name,
            connected: true,
            last_seen: seen_at,
            subscriptions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::now;

    #[test]
    fn should_start_connected_without_subscriptions() {
        let device = ConnectedDevice::new(CentralId::from("ABC"), None, now());
        assert!(device.connected);
        assert!(device.subscriptions.is_empty());
        assert!(device.name.is_none());
    }
}
