//! Identifiers: attribute UUIDs, central identifiers and ATT request ids.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Low 96 bits shared by every SIG-assigned UUID
/// (`0000xxxx-0000-1000-8000-00805F9B34FB`).
const BLUETOOTH_BASE_SUFFIX: u128 = 0x0000_0000_0000_1000_8000_0080_5F9B_34FB;
const BLUETOOTH_BASE_MASK: u128 = 0x0000_0000_FFFF_FFFF_FFFF_FFFF_FFFF_FFFF;

/// UUID of a GATT service or characteristic in canonical form.
///
/// Accepts 16-bit (`180d`), 32-bit (`0000180d`) and 128-bit forms,
/// case-insensitively. The canonical form is uppercase; 128-bit values
/// derived from the Bluetooth base UUID collapse to their short form so
/// that `180D` and `0000180D-0000-1000-8000-00805F9B34FB` name the same
/// attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttributeUuid(String);

impl AttributeUuid {
    /// Parse and normalize an attribute UUID.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidUuid`] when `input` is neither a
    /// 4 or 8 digit hex string nor a 128-bit UUID.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let is_short =
            matches!(trimmed.len(), 4 | 8) && trimmed.chars().all(|c| c.is_ascii_hexdigit());
        if is_short {
            let short = u32::from_str_radix(trimmed, 16)
                .map_err(|_| ValidationError::InvalidUuid(input.to_string()))?;
            return Ok(Self::short(short));
        }

        let full = uuid::Uuid::try_parse(trimmed)
            .map_err(|_| ValidationError::InvalidUuid(input.to_string()))?
            .as_u128();
        if full & BLUETOOTH_BASE_MASK == BLUETOOTH_BASE_SUFFIX {
            // The mask leaves only the top 32 bits.
            let short = u32::try_from(full >> 96)
                .map_err(|_| ValidationError::InvalidUuid(input.to_string()))?;
            return Ok(Self::short(short));
        }
        Ok(Self(
            uuid::Uuid::from_u128(full)
                .hyphenated()
                .to_string()
                .to_ascii_uppercase(),
        ))
    }

    fn short(value: u32) -> Self {
        if value <= 0xFFFF {
            Self(format!("{value:04X}"))
        } else {
            Self(format!("{value:08X}"))
        }
    }

    /// Canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttributeUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AttributeUuid {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AttributeUuid {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AttributeUuid> for String {
    fn from(value: AttributeUuid) -> Self {
        value.0
    }
}

/// Platform-assigned identifier of a connected central. Opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CentralId(String);

impl CentralId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CentralId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CentralId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier the host stack attaches to an ATT request so the response can
/// be matched to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
