use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::FoxdenError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Overrides the cloud base URL from the config file.
pub const ENV_CLOUD_URL: &str = "FOXDEN_CLOUD_URL";
/// Write credential shared with the publisher.
pub const ENV_API_KEY: &str = "FOXCLI_API_KEY";

/// Client-side configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cloud: CloudConfig,
    pub local: LocalConfig,
    pub poll: PollConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// The companion process running on this machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    /// Cooldown before probing again after a failed probe.
    pub retry_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive.
    pub level: String,
    /// Also write a daily log file under the data directory.
    pub file: bool,
}

impl AppConfig {
    /// Load config: user file if it exists, otherwise built-in defaults,
    /// then environment overrides.
    pub fn load() -> Result<Self, FoxdenError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_overrides(
            std::env::var(ENV_CLOUD_URL).ok(),
            std::env::var(ENV_API_KEY).ok(),
        );
        Ok(config)
    }

    /// Load from a specific file, falling back to defaults when it is missing.
    pub fn load_from(path: &Path) -> Result<Self, FoxdenError> {
        if !path.exists() {
            return toml::from_str(DEFAULT_CONFIG).map_err(|e| FoxdenError::Config(e.to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| FoxdenError::Config(e.to_string()))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), FoxdenError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), FoxdenError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FoxdenError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply non-empty overrides on top of file values.
    pub fn apply_overrides(&mut self, cloud_url: Option<String>, api_key: Option<String>) {
        if let Some(url) = cloud_url.filter(|u| !u.is_empty()) {
            self.cloud.base_url = url;
        }
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            self.cloud.api_key = Some(key);
        }
    }

    pub fn local_timeout(&self) -> Duration {
        Duration::from_millis(self.local.timeout_ms)
    }

    pub fn local_retry_interval(&self) -> Duration {
        Duration::from_secs(self.local.retry_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        // A zero interval would spin; clamp to one second.
        Duration::from_secs(self.poll.interval_secs.max(1))
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Directory for rolling log files.
    pub fn log_dir() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.data_dir().join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "foxden")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
