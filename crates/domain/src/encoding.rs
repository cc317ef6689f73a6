//! Control-plane value encodings.

use std::str::FromStr;

use data_encoding::{BASE64, HEXUPPER_PERMISSIVE};
use serde::{Deserialize, Serialize};

use crate::error::EncodingError;

/// How a characteristic value is represented in control-plane requests
/// and responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    #[default]
    Utf8,
    Base64,
    Hex,
}

impl ValueEncoding {
    /// Decode a textual value into raw bytes.
    ///
    /// Base64 uses the standard padded alphabet. Hex takes two digits per
    /// byte in either case; odd-length input is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] on malformed base64 or hex input.
    pub fn decode(self, text: &str) -> Result<Vec<u8>, EncodingError> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Base64 => BASE64
                .decode(text.as_bytes())
                .map_err(EncodingError::Base64),
            Self::Hex => HEXUPPER_PERMISSIVE
                .decode(text.as_bytes())
                .map_err(EncodingError::Hex),
        }
    }

    /// Encode raw bytes for a control-plane response.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::Utf8`] when `utf8` is requested for bytes
    /// that are not valid UTF-8.
    pub fn encode(self, bytes: &[u8]) -> Result<String, EncodingError> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|_| EncodingError::Utf8),
            Self::Base64 => Ok(BASE64.encode(bytes)),
            Self::Hex => Ok(HEXUPPER_PERMISSIVE.encode(bytes)),
        }
    }
}

impl FromStr for ValueEncoding {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "base64" => Ok(Self::Base64),
            "hex" => Ok(Self::Hex),
            _ => Err(EncodingError::Unknown(s.to_string())),
        }
    }
}
