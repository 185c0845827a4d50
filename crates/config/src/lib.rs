#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for sai
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/sai/config.toml)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sai_errors::{ConfigError, Error};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub shell: ShellConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub install: InstallConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Package id recorded as installer of record for every session
    #[serde(default = "default_installer_id")]
    pub installer_id: String,
    /// Leading label of the environment summary in failure reports
    #[serde(default = "default_device_label")]
    pub device_label: String,
}

/// Which privileged shell drives `pm`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ShellBackend {
    /// Root shell on the device itself (`su -c`)
    Su,
    /// Host-side `adb shell`
    Adb,
}

/// Shell backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    #[serde(default = "default_backend")]
    pub backend: ShellBackend,
    #[serde(default = "default_su_binary")]
    pub su_binary: String,
    #[serde(default = "default_adb_binary")]
    pub adb_binary: String,
    /// Device serial for `adb -s`; unset means the only attached device
    #[serde(default)]
    pub serial: Option<String>,
}

/// Package-added watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// How long the CLI waits for the completion notification
    #[serde(default = "default_completion_timeout_secs")]
    pub completion_timeout_secs: u64,
}

/// Install session behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Issue `pm install-abandon` when an attempt fails with a session open
    #[serde(default = "default_abandon_on_failure")]
    pub abandon_on_failure: bool,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            installer_id: default_installer_id(),
            device_label: default_device_label(),
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            su_binary: default_su_binary(),
            adb_binary: default_adb_binary(),
            serial: None,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            completion_timeout_secs: default_completion_timeout_secs(),
        }
    }
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            abandon_on_failure: default_abandon_on_failure(),
        }
    }
}

// Default value functions for serde
fn default_installer_id() -> String {
    constants::DEFAULT_INSTALLER_ID.to_string()
}

fn default_device_label() -> String {
    "Device".to_string()
}

fn default_backend() -> ShellBackend {
    ShellBackend::Adb
}

fn default_su_binary() -> String {
    "su".to_string()
}

fn default_adb_binary() -> String {
    "adb".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_completion_timeout_secs() -> u64 {
    120 // 2 minutes
}

fn default_abandon_on_failure() -> bool {
    true
}

impl WatchConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    #[must_use]
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::APP_DIR_NAME)
            .join(constants::CONFIG_FILE_NAME))
    }

    /// Directory for debug log files
    #[must_use]
    pub fn logs_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(constants::APP_DIR_NAME)
            .join(constants::LOGS_DIR_NAME)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!("no config at {}, using defaults", config_path.display());
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // SAI_SHELL
        if let Ok(backend) = std::env::var("SAI_SHELL") {
            self.shell.backend = match backend.as_str() {
                "su" => ShellBackend::Su,
                "adb" => ShellBackend::Adb,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "SAI_SHELL".to_string(),
                        value: backend,
                    }
                    .into())
                }
            };
        }

        // SAI_ADB_SERIAL
        if let Ok(serial) = std::env::var("SAI_ADB_SERIAL") {
            self.shell.serial = (!serial.is_empty()).then_some(serial);
        }

        // SAI_INSTALLER_ID
        if let Ok(installer_id) = std::env::var("SAI_INSTALLER_ID") {
            if installer_id.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "SAI_INSTALLER_ID".to_string(),
                    value: installer_id,
                }
                .into());
            }
            self.general.installer_id = installer_id;
        }

        // SAI_COMPLETION_TIMEOUT
        if let Ok(timeout) = std::env::var("SAI_COMPLETION_TIMEOUT") {
            self.watch.completion_timeout_secs =
                timeout.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "SAI_COMPLETION_TIMEOUT".to_string(),
                    value: timeout,
                })?;
        }

        Ok(())
    }
}
