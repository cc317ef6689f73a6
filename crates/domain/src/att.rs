//! ATT request outcomes and the response codes they translate to.

use serde::Serialize;

/// Result of serving a central's read request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "camelCase")]
pub enum ReadOutcome {
    Found(Vec<u8>),
    AttributeNotFound,
    NotReadable,
}

/// Result of serving a single write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WriteOutcome {
    Accepted,
    AttributeNotFound,
    NotWriteable,
}

/// ATT protocol error codes used in responses (Core Spec Vol 3, Part F, 3.4.1.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttStatus {
    Success,
    ReadNotPermitted,
    WriteNotPermitted,
    AttributeNotFound,
}

impl AttStatus {
    /// Wire value of the status code.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0x00,
            Self::ReadNotPermitted => 0x02,
            Self::WriteNotPermitted => 0x03,
            Self::AttributeNotFound => 0x0A,
        }
    }
}

impl ReadOutcome {
    #[must_use]
    pub fn status(&self) -> AttStatus {
        match self {
            Self::Found(_) => AttStatus::Success,
            Self::AttributeNotFound => AttStatus::AttributeNotFound,
            Self::NotReadable => AttStatus::ReadNotPermitted,
        }
    }
}

impl WriteOutcome {
    #[must_use]
    pub fn status(self) -> AttStatus {
        match self {
            Self::Accepted => AttStatus::Success,
            Self::AttributeNotFound => AttStatus::AttributeNotFound,
            Self::NotWriteable => AttStatus::WriteNotPermitted,
        }
    }
}
