//! Loopback radio configuration.

use serde::Deserialize;

/// Link characteristics of the simulated radio.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoopbackConfig {
    /// Largest notification payload the link accepts, in bytes.
    ///
    /// The default matches a 185-byte ATT MTU minus the 3-byte header.
    pub max_payload: usize,
    /// How many notifications, read responses and write responses the link
    /// remembers. Older entries are dropped first.
    pub history: usize,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            max_payload: 182,
            history: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_common_mtu_payload() {
        assert_eq!(LoopbackConfig::default().max_payload, 182);
    }

    #[test]
    fn should_deserialize_from_toml() {
        let config: LoopbackConfig = toml::from_str("max_payload = 20\nhistory = 8").unwrap();
        assert_eq!(config.max_payload, 20);
        assert_eq!(config.history, 8);
    }

    #[test]
    fn should_fill_missing_fields_with_defaults() {
        let config: LoopbackConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_payload, 182);
        assert_eq!(config.history, 256);
    }
}
