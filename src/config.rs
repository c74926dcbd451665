//! TOML-backed daemon configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Publish endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// `tcp://*:PORT` to bind, `tcp://host:PORT` to feed a broker
    pub endpoint: String,
    /// Inbound queue bound on the subscriber side of each connection
    pub high_water_mark: usize,
    /// Total send timeout in milliseconds, negative waits forever
    pub send_timeout_ms: i64,
    /// Keep only the newest message per topic
    pub conflate: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            endpoint: "tcp://*:5555".to_string(),
            high_water_mark: 1000,
            send_timeout_ms: 1000,
            conflate: false,
        }
    }
}

/// Subscribe endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriberConfig {
    pub endpoint: String,
    pub high_water_mark: usize,
    /// Total receive timeout in milliseconds, negative waits forever
    pub receive_timeout_ms: i64,
    pub conflate: bool,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            endpoint: "tcp://localhost:5555".to_string(),
            high_water_mark: 1000,
            receive_timeout_ms: 1000,
            conflate: false,
        }
    }
}

/// Simulated sensor cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    pub camera_interval_ms: u64,
    pub lidar_interval_ms: u64,
    pub imu_interval_ms: u64,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            camera_interval_ms: 33,
            lidar_interval_ms: 100,
            imu_interval_ms: 10,
        }
    }
}

/// REST control server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub enabled: bool,
    pub listen: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Top-level daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub publisher: PublisherConfig,
    pub sensors: SensorsConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
