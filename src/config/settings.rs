use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration settings for the relay.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub serial: SerialSettings,
    pub source: SourceSettings,
    pub hub: HubSettings,
    pub logging: LoggingSettings,
}

/// Where the WebSocket server listens.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// The hardware link.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SerialSettings {
    /// OS device path, e.g. `/dev/ttyUSB0` or `COM6`.
    pub path: String,
    pub baud_rate: u32,
    /// Per-read timeout. Timeouts on an idle port are not faults.
    pub timeout_ms: u64,
}

impl SerialSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Telemetry source selection, decided once at startup.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SourceSettings {
    /// Skip the hardware entirely and generate synthetic records.
    pub simulate: bool,
    /// Simulation tick.
    pub interval_ms: u64,
    /// Switch to simulation when the hardware link fails after opening.
    /// Failing to open always switches.
    pub fallback_on_fault: bool,
}

impl SourceSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

/// Broadcast hub limits.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HubSettings {
    pub max_subscribers: usize,
}

/// Log level and output format.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Default, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub serial: Option<PartialSerialSettings>,
    pub source: Option<PartialSourceSettings>,
    pub hub: Option<PartialHubSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialSerialSettings {
    pub path: Option<String>,
    pub baud_rate: Option<u32>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialSourceSettings {
    pub simulate: Option<bool>,
    pub interval_ms: Option<u64>,
    pub fallback_on_fault: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialHubSettings {
    pub max_subscribers: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl PartialSettings {
    /// Fill every missing value from `default`.
    pub fn merge(self, default: Settings) -> Settings {
        let server = self.server.unwrap_or_default();
        let serial = self.serial.unwrap_or_default();
        let source = self.source.unwrap_or_default();
        let hub = self.hub.unwrap_or_default();
        let logging = self.logging.unwrap_or_default();

        Settings {
            server: ServerSettings {
                host: server.host.unwrap_or(default.server.host),
                port: server.port.unwrap_or(default.server.port),
            },
            serial: SerialSettings {
                path: serial.path.unwrap_or(default.serial.path),
                baud_rate: serial.baud_rate.unwrap_or(default.serial.baud_rate),
                timeout_ms: serial.timeout_ms.unwrap_or(default.serial.timeout_ms),
            },
            source: SourceSettings {
                simulate: source.simulate.unwrap_or(default.source.simulate),
                interval_ms: source.interval_ms.unwrap_or(default.source.interval_ms),
                fallback_on_fault: source
                    .fallback_on_fault
                    .unwrap_or(default.source.fallback_on_fault),
            },
            hub: HubSettings {
                max_subscribers: hub
                    .max_subscribers
                    .unwrap_or(default.hub.max_subscribers),
            },
            logging: LoggingSettings {
                level: logging.level.unwrap_or(default.logging.level),
                json: logging.json.unwrap_or(default.logging.json),
            },
        }
    }
}

/// Provides default values for `Settings`.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            serial: SerialSettings {
                path: "/dev/ttyUSB0".to_string(),
                baud_rate: 9600,
                timeout_ms: 1000,
            },
            source: SourceSettings {
                simulate: false,
                interval_ms: 1000,
                fallback_on_fault: true,
            },
            hub: HubSettings {
                max_subscribers: 1000,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                json: false,
            },
        }
    }
}
