//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `perihub.toml` in the working directory, or the file named by
//! `PERIHUB_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Event router and event bus sizing.
    pub peripheral: PeripheralConfig,
    /// Radio backend selection.
    pub radio: RadioConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Channel sizing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PeripheralConfig {
    /// Commands and radio events the router mailbox holds before senders wait.
    pub mailbox_capacity: usize,
    /// Events buffered per SSE subscriber before it starts lagging.
    pub event_bus_capacity: usize,
}

/// Which host stack drives the peripheral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadioBackend {
    /// In-process simulation.
    #[default]
    Loopback,
}

/// Radio configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    pub backend: RadioBackend,
    /// Report the radio as powered on right after startup.
    pub power_on_at_startup: bool,
    /// Largest notification payload the loopback link accepts, in bytes.
    pub max_payload: usize,
    /// Entries kept in each loopback traffic log.
    pub history: usize,
}

impl Config {
    /// Load configuration from `perihub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("PERIHUB_CONFIG").unwrap_or_else(|_| "perihub.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PERIHUB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("PERIHUB_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("PERIHUB_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("PERIHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.peripheral.mailbox_capacity == 0 {
            return Err(ConfigError::Validation(
                "peripheral.mailbox_capacity must be non-zero".to_string(),
            ));
        }
        if self.peripheral.event_bus_capacity == 0 {
            return Err(ConfigError::Validation(
                "peripheral.event_bus_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "perihubd=info,perihub_app=info,perihub_adapter_loopback=info,tower_http=debug"
                .to_string(),
        }
    }
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 64,
            event_bus_capacity: 256,
        }
    }
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            backend: RadioBackend::Loopback,
            power_on_at_startup: true,
            max_payload: 182,
            history: 256,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
