use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::transport::LinkSettings;

/// Optional overrides, read from the working directory.
pub const CONFIG_FILE: &str = "quadruped.json";

#[cfg(windows)]
const DEFAULT_PORT: &str = "COM9";
#[cfg(not(windows))]
const DEFAULT_PORT: &str = "/dev/ttyACM0";
#[cfg(windows)]
const DEFAULT_BENCH_PORT: &str = "COM10";
#[cfg(not(windows))]
const DEFAULT_BENCH_PORT: &str = "/dev/ttyUSB0";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error("Bad config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Control surface settings. Any field missing from the config file keeps
/// its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    pub port_name: String,
    pub baud_rate: u32,
    /// Initial contents of the filename field used by save and load.
    pub pose_file: PathBuf,
    pub walk_left_file: PathBuf,
    pub walk_right_file: PathBuf,
    pub receive_timeout_ms: u64,
    pub send_delay_ms: u64,
    /// Port the bench receiver listens on, the far end of `port_name`.
    pub bench_port_name: String,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            port_name: DEFAULT_PORT.to_string(),
            baud_rate: 115_200,
            pose_file: PathBuf::from("stand.json"),
            walk_left_file: PathBuf::from("left.json"),
            walk_right_file: PathBuf::from("right.json"),
            receive_timeout_ms: 1000,
            send_delay_ms: 100,
            bench_port_name: DEFAULT_BENCH_PORT.to_string(),
        }
    }
}

impl ControlConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Reads `path` if it exists; any problem falls back to the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            port_name: self.port_name.clone(),
            baud_rate: self.baud_rate,
            receive_timeout: Duration::from_millis(self.receive_timeout_ms),
            send_delay: Duration::from_millis(self.send_delay_ms),
        }
    }
}
