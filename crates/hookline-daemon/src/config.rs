//! Daemon configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use hookline_core::ReadPolicy;
use hookline_hid::ScanConfig;
use hookline_hid::discovery::{DEFAULT_PATH_PREFIX, DEFAULT_SCAN_COUNT};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "HOOKLINE_CONFIG";

/// Daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Daemon settings
    #[serde(default)]
    pub daemon: DaemonConfig,
    /// Device settings
    #[serde(default)]
    pub device: DeviceConfig,
    /// Session settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Daemon-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self { log_level: default_log_level(), log_format: LogFormat::default() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Device settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Explicit hiddev node; skips scanning
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Prefix of the scanned nodes
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    /// Number of nodes scanned
    #[serde(default = "default_scan_count")]
    pub scan_count: u32,
    /// USB Vendor ID
    #[serde(default = "default_vid")]
    pub vendor_id: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: None,
            path_prefix: default_path_prefix(),
            scan_count: default_scan_count(),
            vendor_id: default_vid(),
        }
    }
}

impl DeviceConfig {
    /// Discovery parameters.
    ///
    /// # Errors
    /// Returns an error if `vendor_id` is not a 16-bit hex number.
    pub fn scan_config(&self) -> Result<ScanConfig> {
        let digits = self.vendor_id.trim_start_matches("0x").trim_start_matches("0X");
        let vendor_id = u16::from_str_radix(digits, 16)
            .with_context(|| format!("Invalid vendor_id: {:?}", self.vendor_id))?;
        Ok(ScanConfig { path_prefix: self.path_prefix.clone(), scan_count: self.scan_count, vendor_id })
    }
}

fn default_path_prefix() -> String {
    DEFAULT_PATH_PREFIX.to_string()
}

fn default_scan_count() -> u32 {
    DEFAULT_SCAN_COUNT
}

fn default_vid() -> String {
    "0b0e".to_string()
}

/// Session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Readiness wait of the event thread
    #[serde(default = "default_event_poll_ms")]
    pub event_poll_ms: u64,
    /// Console polling cadence
    #[serde(default = "default_input_tick_ms")]
    pub input_tick_ms: u64,
    /// Read the indicators at startup
    #[serde(default = "default_true")]
    pub sync_on_start: bool,
    /// Re-submit the owning report after each read
    #[serde(default)]
    pub commit_after_read: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            event_poll_ms: default_event_poll_ms(),
            input_tick_ms: default_input_tick_ms(),
            sync_on_start: true,
            commit_after_read: false,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn event_poll(&self) -> Duration {
        Duration::from_millis(self.event_poll_ms)
    }

    #[must_use]
    pub fn input_tick(&self) -> Duration {
        Duration::from_millis(self.input_tick_ms.max(1))
    }

    #[must_use]
    pub fn read_policy(&self) -> ReadPolicy {
        if self.commit_after_read { ReadPolicy::CommitAfterRead } else { ReadPolicy::ReadOnly }
    }
}

fn default_event_poll_ms() -> u64 {
    1000
}

fn default_input_tick_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

/// Load configuration from file or defaults.
pub fn load_config() -> Result<Config> {
    let config_path = match std::env::var_os(CONFIG_ENV) {
        Some(path) => PathBuf::from(path),
        None => config_path()?,
    };
    load_from(&config_path)
}

fn load_from(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {config_path:?}"))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {config_path:?}"))?;
        Ok(config)
    } else {
        info!(?config_path, "Config file not found, using defaults");
        Ok(Config::default())
    }
}

/// Get the configuration file path.
fn config_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "hookline", "Hookline")
        .context("Could not determine config directory")?;
    Ok(dirs.config_dir().join("config.toml"))
}
