//! Link and session configuration, stored as JSON.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plausibility::PlausibilityLimits;

/// Default serial device
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Default line rate of the IMU's serial output
pub const DEFAULT_BAUD_RATE: u32 = 1_250_000;

/// Default bound on a single byte read before the stream counts as stalled
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// IMU link settings.
///
/// Missing keys fall back to their defaults, so a file only needs the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImuConfig {
    /// Serial device path
    pub port: String,
    pub baud_rate: u32,
    /// Byte read timeout; a read exceeding it ends the session
    pub read_timeout_ms: u64,
    /// Range check applied before integration. `None` integrates every frame.
    pub limits: Option<PlausibilityLimits>,
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            limits: None,
        }
    }
}

impl ImuConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write as pretty-printed JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}
