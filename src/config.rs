//! Configuration system for the monitoring agent
//!
//! One TOML file describes the device identity, the broker endpoint, the
//! scan-loop cadence, and the channel-to-pin mapping. Credentials are never
//! stored in the file; the config names environment variables and the values
//! are resolved at the start of each connection attempt sequence.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::protocol::topics::validate_identifier;

/// Main agent configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    pub device: DeviceSection,
    pub mqtt: MqttSection,
    #[serde(default)]
    pub monitor: MonitorSection,
    #[serde(default)]
    pub inputs: Vec<InputSection>,
}

/// Device identity section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceSection {
    /// Device name, the first topic segment (must match [a-zA-Z0-9._-]+)
    pub name: String,
}

/// MQTT broker section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MqttSection {
    /// Broker URL with protocol and port (`mqtt://` or `mqtts://`).
    /// Empty means "not configured yet": the agent idles without
    /// attempting connections until a URL is supplied.
    #[serde(default)]
    pub broker_url: String,
    /// Environment variable containing the username
    pub username_env: Option<String>,
    /// Environment variable containing the password
    pub password_env: Option<String>,
    /// Liveness heartbeat interval in seconds (default: 60)
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,
}

fn default_heartbeat_interval() -> u64 {
    60
}

/// Scan-loop cadence and retry policy section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorSection {
    /// Minimum delay between scan iterations in milliseconds
    #[serde(default = "default_scan_interval_ms")]
    pub scan_interval_ms: u64,
    /// Connection attempts per sequence before reporting Disconnected
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
    /// Delay between attempts within one sequence, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_scan_interval_ms() -> u64 {
    50
}

fn default_connect_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    3000
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            scan_interval_ms: default_scan_interval_ms(),
            connect_attempts: default_connect_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// One monitored input: a stable name and its BCM pin number
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputSection {
    /// Channel name, the last topic segment (must match [a-zA-Z0-9._-]+)
    pub name: String,
    /// BCM pin number the channel reads
    pub pin: u8,
}

/// Immutable broker endpoint and credentials, captured once per connection
/// attempt sequence. The core only reads this, never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSnapshot {
    pub broker_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid identifier '{name}': {source}")]
    InvalidIdentifier {
        name: String,
        source: crate::protocol::ValidationError,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MqttSection {
    /// Capture the endpoint for one attempt sequence.
    ///
    /// Returns `None` while no broker URL is configured; that is a valid
    /// idle state, not an error. Credentials are read from the environment
    /// here so an operator can rotate them without restarting the agent.
    pub fn endpoint_snapshot(&self) -> Option<EndpointSnapshot> {
        if self.broker_url.trim().is_empty() {
            return None;
        }

        Some(EndpointSnapshot {
            broker_url: self.broker_url.clone(),
            username: resolve_env(self.username_env.as_ref()),
            password: resolve_env(self.password_env.as_ref()),
        })
    }
}

fn resolve_env(var_name: Option<&String>) -> Option<String> {
    var_name.and_then(|name| std::env::var(name).ok())
}

impl MonitorConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: MonitorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate identifiers, cadence values, and the input mapping.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_identifier(&self.device.name)?;

        for input in &self.inputs {
            check_identifier(&input.name)?;
        }

        for (i, a) in self.inputs.iter().enumerate() {
            for b in &self.inputs[i + 1..] {
                if a.name == b.name {
                    return Err(ConfigError::InvalidConfig(format!(
                        "duplicate channel name '{}'",
                        a.name
                    )));
                }
                if a.pin == b.pin {
                    return Err(ConfigError::InvalidConfig(format!(
                        "pin {} mapped to both '{}' and '{}'",
                        a.pin, a.name, b.name
                    )));
                }
            }
        }

        if self.monitor.connect_attempts == 0 {
            return Err(ConfigError::InvalidConfig(
                "connect_attempts must be at least 1".to_string(),
            ));
        }
        if self.monitor.scan_interval_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "scan_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.mqtt.heartbeat_interval_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "heartbeat_interval_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// BCM pins in channel configuration order, for input-source setup.
    pub fn bcm_pins(&self) -> Vec<u8> {
        self.inputs.iter().map(|input| input.pin).collect()
    }
}

fn check_identifier(name: &str) -> Result<(), ConfigError> {
    validate_identifier(name).map_err(|source| ConfigError::InvalidIdentifier {
        name: name.to_string(),
        source,
    })
}
