//! Simulator configuration
//!
//! Optional JSON file with transport settings and sensor overrides. Command
//! line flags are applied on top with [`SimulatorConfig::apply_cli`], and the
//! file and command line overrides are merged into one table by
//! [`SimulatorConfig::response_overrides`].
//!
//! ```json
//! {
//!   "transport": { "backend": "serial", "port": "/dev/ttyUSB0", "baud_rate": 10400 },
//!   "overrides": [ { "sensor_id": 8, "value": 4660 } ]
//! }
//! ```

use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::overrides::ResponseOverrides;

/// K-Line baud rate used by the MEMS 2J ECU
pub const DEFAULT_BAUD_RATE: u32 = 10_400;

/// Default read and write timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 100;

pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";

/// Which driver talks to the cable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum Backend {
    /// FTDI D2XX direct control
    Ftdi,
    /// Operating system serial port (VCP or pty)
    Serial,
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(feature = "ftdi") {
            Backend::Ftdi
        } else {
            Backend::Serial
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Ftdi => f.write_str("ftdi"),
            Backend::Serial => f.write_str("serial"),
        }
    }
}

/// Serial line settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    pub backend: Backend,
    /// Serial device path (serial backend)
    pub port: String,
    /// FTDI device index (ftdi backend)
    pub device_index: i32,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            port: DEFAULT_SERIAL_PORT.to_string(),
            device_index: 0,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
            write_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl TransportSettings {
    /// Reject settings that would leave the link deaf
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("read_timeout_ms"));
        }
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout("write_timeout_ms"));
        }
        Ok(())
    }
}

/// Transport settings given on the command line. `None` keeps the file value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOverrides {
    pub backend: Option<Backend>,
    pub port: Option<String>,
    pub device_index: Option<i32>,
    pub baud_rate: Option<u32>,
    pub read_timeout_ms: Option<u64>,
    pub write_timeout_ms: Option<u64>,
}

/// One simulated sensor value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEntry {
    pub sensor_id: u8,
    pub value: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub transport: TransportSettings,
    pub overrides: Vec<OverrideEntry>,
}

impl SimulatorConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Override pairs in file order
    pub fn override_pairs(&self) -> Vec<(u8, u16)> {
        self.overrides.iter().map(|o| (o.sensor_id, o.value)).collect()
    }

    /// Apply command line flags over the file settings and validate the result
    pub fn apply_cli(&mut self, cli: &TransportOverrides) -> Result<(), ConfigError> {
        let settings = &mut self.transport;

        if let Some(backend) = cli.backend {
            settings.backend = backend;
        }
        if let Some(port) = &cli.port {
            settings.port = port.clone();
        }
        if let Some(index) = cli.device_index {
            settings.device_index = index;
        }
        if let Some(baud) = cli.baud_rate {
            settings.baud_rate = baud;
        }
        if let Some(timeout) = cli.read_timeout_ms {
            settings.read_timeout_ms = timeout;
        }
        if let Some(timeout) = cli.write_timeout_ms {
            settings.write_timeout_ms = timeout;
        }

        settings.validate()
    }

    /// File overrides followed by command line pairs, validated as one table.
    ///
    /// A sensor named in both places is a duplicate.
    pub fn response_overrides(
        &self,
        cli_pairs: impl IntoIterator<Item = (u8, u16)>,
    ) -> Result<ResponseOverrides, ConfigError> {
        let mut pairs = self.override_pairs();
        pairs.extend(cli_pairs);
        ResponseOverrides::from_pairs(pairs)
    }
}
