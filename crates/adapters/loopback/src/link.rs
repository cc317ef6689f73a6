//! State shared between the radio and its controller: who is subscribed on
//! the simulated link, and everything the peripheral sent over it.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use perihub_domain::att::{ReadOutcome, WriteOutcome};
use perihub_domain::id::{AttributeUuid, CentralId, RequestId};
use perihub_domain::service::ServiceDefinition;

/// A notification that left the peripheral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub characteristic: AttributeUuid,
    pub value: Vec<u8>,
    pub recipients: Vec<CentralId>,
}

/// What the peripheral is currently advertising.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    pub local_name: String,
    pub service_uuids: Vec<AttributeUuid>,
}

#[derive(Debug, Default)]
pub(crate) struct LinkState {
    pub subscribers: HashMap<AttributeUuid, Vec<CentralId>>,
    pub queue_full: bool,
    pub next_request: u64,
    pub topology: Vec<ServiceDefinition>,
    pub advertisement: Option<Advertisement>,
    /// Cap on each of the logs below.
    pub history: usize,
    pub notifications: VecDeque<Notification>,
    pub reads: VecDeque<(RequestId, ReadOutcome)>,
    pub writes: VecDeque<(RequestId, WriteOutcome)>,
}

/// Append to a log holding at most `cap` entries, evicting the oldest.
pub(crate) fn record<T>(log: &mut VecDeque<T>, cap: usize, entry: T) {
    if cap == 0 {
        return;
    }
    while log.len() >= cap {
        log.pop_front();
    }
    log.push_back(entry);
}

impl LinkState {
    pub fn recipients(
        &self,
        characteristic: &AttributeUuid,
        target: Option<&CentralId>,
    ) -> Vec<CentralId> {
        let Some(centrals) = self.subscribers.get(characteristic) else {
            return Vec::new();
        };
        centrals
            .iter()
            .filter(|c| target.is_none_or(|t| t == *c))
            .cloned()
            .collect()
    }

    pub fn next_request(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }
}

/// Cheaply cloneable handle on the link state.
#[derive(Debug, Clone)]
pub(crate) struct Link(Arc<Mutex<LinkState>>);

impl Link {
    pub fn new(history: usize) -> Self {
        Self(Arc::new(Mutex::new(LinkState {
            history,
            ..LinkState::default()
        })))
    }

    // Critical sections never panic, so a poisoned lock still holds
    // consistent data.
    pub fn lock(&self) -> MutexGuard<'_, LinkState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uuid(s: &str) -> AttributeUuid {
        AttributeUuid::parse(s).unwrap()
    }

    #[test]
    fn should_list_every_subscriber_without_target() {
        let mut state = LinkState::default();
        state.subscribers.insert(
            uuid("2A37"),
            vec![CentralId::from("ABC"), CentralId::from("DEF")],
        );

        assert_eq!(state.recipients(&uuid("2A37"), None).len(), 2);
        assert!(state.recipients(&uuid("2A38"), None).is_empty());
    }

    #[test]
    fn should_narrow_recipients_to_target() {
        let mut state = LinkState::default();
        state.subscribers.insert(
            uuid("2A37"),
            vec![CentralId::from("ABC"), CentralId::from("DEF")],
        );

        let target = CentralId::from("DEF");
        assert_eq!(
            state.recipients(&uuid("2A37"), Some(&target)),
            vec![CentralId::from("DEF")]
        );
        let stranger = CentralId::from("XYZ");
        assert!(state.recipients(&uuid("2A37"), Some(&stranger)).is_empty());
    }

    #[test]
    fn should_evict_oldest_entries_past_history_cap() {
        let mut log = VecDeque::new();
        for n in 0..5 {
            record(&mut log, 3, n);
        }
        assert_eq!(log, VecDeque::from([2, 3, 4]));
    }

    #[test]
    fn should_keep_nothing_with_zero_history() {
        let mut log = VecDeque::new();
        record(&mut log, 0, 1);
        assert!(log.is_empty());
    }

    #[test]
    fn should_hand_out_increasing_request_ids() {
        let mut state = LinkState::default();
        assert_eq!(state.next_request(), RequestId(1));
        assert_eq!(state.next_request(), RequestId(2));
    }
}
