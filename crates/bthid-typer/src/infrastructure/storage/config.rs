//! TOML-based configuration for the typer.
//!
//! The file lives at `$XDG_CONFIG_HOME/bthid-typer/config.toml`, falling back
//! to `~/.config/bthid-typer/config.toml`.  `--config PATH` on the command
//! line points somewhere else.
//!
//! ```toml
//! [typer]
//! log_level = "info"
//! preamble_len = 10
//!
//! [bluetooth]
//! source = "00:11:22:33:44:55"   # optional, absent = any adapter
//! target = "AA:BB:CC:DD:EE:FF"   # optional, must be set here or on the CLI
//!
//! [service]
//! name = "Bluetooth Keyboard"
//! description = "Virtual keyboard"
//! provider = "bthid-typer"
//! ```
//!
//! Every section and field may be omitted; missing values take the defaults
//! shown above.  A missing file is the same as an empty one.  Timing
//! constants are not configurable.

use std::path::{Path, PathBuf};

use bthid_core::protocol::sdp::ServiceInfo;
use bthid_core::BdAddr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::type_text::DEFAULT_PREAMBLE_LEN;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub typer: TyperConfig,
    #[serde(default)]
    pub bluetooth: BluetoothConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

/// General behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TyperConfig {
    /// Tracing filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Number of throw-away keystrokes typed before the payload.
    #[serde(default = "default_preamble_len")]
    pub preamble_len: usize,
}

/// Local and remote Bluetooth addresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BluetoothConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<BdAddr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<BdAddr>,
}

/// Strings advertised in the SDP keyboard record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default = "default_service_description")]
    pub description: String,
    #[serde(default = "default_service_provider")]
    pub provider: String,
}

impl ServiceConfig {
    pub fn to_service_info(&self) -> ServiceInfo {
        ServiceInfo {
            name: self.name.clone(),
            description: self.description.clone(),
            provider: self.provider.clone(),
        }
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_preamble_len() -> usize {
    DEFAULT_PREAMBLE_LEN
}
fn default_service_name() -> String {
    "Bluetooth Keyboard".to_string()
}
fn default_service_description() -> String {
    "Virtual keyboard".to_string()
}
fn default_service_provider() -> String {
    "bthid-typer".to_string()
}

impl Default for TyperConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            preamble_len: default_preamble_len(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            description: default_service_description(),
            provider: default_service_provider(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the per-user directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when neither
/// `XDG_CONFIG_HOME` nor `HOME` is set.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `$XDG_CONFIG_HOME/bthid-typer` or `~/.config/bthid-typer`.
fn platform_config_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("bthid-typer"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
