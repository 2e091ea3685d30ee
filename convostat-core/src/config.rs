//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/convostat/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/convostat/` (~/.config/convostat/)
//! - State/Logs: `$XDG_STATE_HOME/convostat/` (~/.local/state/convostat/)

use crate::error::{Error, Result};
use crate::types::ZeroDenominatorPolicy;
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Whose messages are pinned first in every output
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Time zone used for all bucket keys
    #[serde(default)]
    pub time: TimeConfig,

    /// Comparative view settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Identity configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct IdentityConfig {
    /// Sender name of the person running the tool. Ignored if it doesn't
    /// match any sender.
    pub self_name: Option<String>,
}

/// Time configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TimeConfig {
    /// IANA time zone name (e.g. "America/Chicago", "UTC")
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl TimeConfig {
    /// Resolve the configured zone name.
    pub fn tz(&self) -> Result<Tz> {
        parse_timezone(&self.timezone)
    }
}

fn default_timezone() -> String {
    "America/Chicago".to_string()
}

/// Parse an IANA time zone name.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| Error::UnknownTimeZone(name.to_string()))
}

/// Analysis configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct AnalysisConfig {
    /// What share/difference views emit where the denominator is zero
    #[serde(default)]
    pub zero_denominator: ZeroDenominatorPolicy,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but can't be used
    pub fn validate(&self) -> Result<()> {
        self.time.tz()?;
        if self.logging.max_files == 0 {
            return Err(Error::Config(
                "logging.max_files must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/convostat/config.toml` (~/.config/convostat/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("convostat").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/convostat/` (~/.local/state/convostat/). The daily
    /// rolling logger writes `convostat.YYYY-MM-DD.log` files here.
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("convostat")
    }
}
