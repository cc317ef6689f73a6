//! Timestamps for device bookkeeping and emitted events.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `last_seen` and event times.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
