//! Configuration loading
//!
//! Configuration file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `VIDEOLOG_CONFIG` environment variable
//! 3. `<config_dir>/videolog/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! A file named on the command line must exist. A missing file from tiers 2
//! or 3 is not fatal: a warning is logged and the compiled defaults are used.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::events::DEFAULT_EVENT_CAPACITY;
use crate::window::AcceptanceWindow;
use crate::{Error, Result};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "VIDEOLOG_CONFIG";

/// Default studio search radius in meters
pub const DEFAULT_RADIUS_M: f64 = 100.0;

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing filter directive (e.g. "info", "videolog_browser=debug")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write log output to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// One `[[studios]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioEntry {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius")]
    pub radius_m: f64,
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS_M
}

/// Contents of `config.toml`
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Path to the media library manifest
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_manifest: Option<PathBuf>,

    /// Event bus channel capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Which creation timestamps count as relevant
    #[serde(default)]
    pub acceptance_window: AcceptanceWindow,

    /// Studio registry; empty means the built-in default studio
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub studios: Vec<StudioEntry>,
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            library_manifest: None,
            event_capacity: default_event_capacity(),
            logging: LoggingConfig::default(),
            acceptance_window: AcceptanceWindow::default(),
            studios: Vec::new(),
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserConfigDir(PathBuf),
    CompiledDefaults,
}

impl ConfigSource {
    /// Path of the file backing this source, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::CommandLine(p)
            | ConfigSource::Environment(p)
            | ConfigSource::UserConfigDir(p) => Some(p),
            ConfigSource::CompiledDefaults => None,
        }
    }
}

/// Resolves and loads the configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Pick the configuration source without reading it
    pub fn resolve(&self) -> ConfigSource {
        if let Some(path) = &self.cli_path {
            return ConfigSource::CommandLine(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return ConfigSource::Environment(PathBuf::from(path));
            }
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                return ConfigSource::UserConfigDir(path);
            }
        }

        ConfigSource::CompiledDefaults
    }

    /// Resolve and load, degrading to defaults where allowed
    pub fn load(&self) -> Result<(TomlConfig, ConfigSource)> {
        let source = self.resolve();
        let config = match &source {
            ConfigSource::CommandLine(path) => load_toml_config(path)?,
            ConfigSource::Environment(path) | ConfigSource::UserConfigDir(path) => {
                if path.exists() {
                    load_toml_config(path)?
                } else {
                    warn!(
                        "Config file {} not found, using compiled defaults",
                        path.display()
                    );
                    TomlConfig::default()
                }
            }
            ConfigSource::CompiledDefaults => {
                info!("No config file found, using compiled defaults");
                TomlConfig::default()
            }
        };
        Ok((config, source))
    }
}

/// Per-user configuration file location for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("videolog").join("config.toml"))
}

/// Read and parse a TOML configuration file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write a configuration file atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
