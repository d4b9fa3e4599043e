//! Configuration resolution with precedence handling.
//!
//! Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest).

use crate::engine::DedupKey;
use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory name used under the XDG base directories.
pub const APP_DIR: &str = "mm";

/// Optional settings file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Room alias table inside the config directory.
pub const ROOMS_FILE_NAME: &str = "rooms.json";

/// Sender alias table inside the config directory.
pub const ACCOUNTS_FILE_NAME: &str = "accounts.json";

/// Default timestamp pattern: hour and minute, padded before the body.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M    ";

/// Sender display name whose messages are printed without emphasis.
pub const DEFAULT_SELF_IDENTITY: &str = "me";

/// Environment variable overriding the time format.
pub const TIME_FORMAT_ENV: &str = "MMVIEW_TIME_FORMAT";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a regular file).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// Time format pattern contains a specifier chrono cannot render.
    #[error("Invalid time format: {0:?}")]
    InvalidTimeFormat(String),
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, defaults are used.
/// Corresponds to `~/.config/mm/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// strftime pattern for the timestamp column.
    #[serde(default)]
    pub time_format: Option<String>,

    /// Sender display name treated as "my own messages".
    #[serde(default)]
    pub self_identity: Option<String>,

    /// Seen-set key policy.
    #[serde(default)]
    pub dedup_key: Option<DedupKey>,

    /// Path to log file for diagnostics (stderr when absent).
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Storage locations: where messages live and where aliases live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDirs {
    /// Message storage tree.
    pub data_dir: PathBuf,
    /// Directory holding the alias files and `config.toml`.
    pub config_dir: PathBuf,
}

/// Resolved configuration after applying precedence rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Root of the message tree.
    pub data_dir: PathBuf,
    /// Directory holding `config.toml`, `rooms.json` and `accounts.json`.
    pub config_dir: PathBuf,
    /// strftime pattern for message timestamps.
    pub time_format: String,
    /// Sender display name printed without emphasis.
    pub self_identity: String,
    /// Seen-set key policy.
    pub dedup_key: DedupKey,
    /// Diagnostics file; `None` logs to stderr.
    pub log_file_path: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Defaults for everything except the storage locations.
    pub fn with_dirs(dirs: StorageDirs) -> Self {
        Self {
            data_dir: dirs.data_dir,
            config_dir: dirs.config_dir,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            self_identity: DEFAULT_SELF_IDENTITY.to_string(),
            dedup_key: DedupKey::default(),
            log_file_path: None,
        }
    }

    /// Path of the optional TOML settings file.
    pub fn config_file_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Path of the room alias table.
    pub fn rooms_path(&self) -> PathBuf {
        self.config_dir.join(ROOMS_FILE_NAME)
    }

    /// Path of the sender alias table.
    pub fn accounts_path(&self) -> PathBuf {
        self.config_dir.join(ACCOUNTS_FILE_NAME)
    }
}

/// Resolve an XDG base directory.
///
/// Uses `base` (the value of e.g. `XDG_DATA_HOME`) when set and non-empty,
/// otherwise `home` joined with `fallback`. [`APP_DIR`] is appended either way.
pub fn xdg_dir(base: Option<OsString>, home: &Path, fallback: &[&str]) -> PathBuf {
    match base.filter(|b| !b.is_empty()) {
        Some(base) => PathBuf::from(base).join(APP_DIR),
        None => {
            let mut dir = home.to_path_buf();
            dir.extend(fallback);
            dir.join(APP_DIR)
        }
    }
}

/// `$XDG_DATA_HOME/mm`, or `~/.local/share/mm`.
pub fn default_data_dir(home: &Path) -> PathBuf {
    xdg_dir(std::env::var_os("XDG_DATA_HOME"), home, &[".local", "share"])
}

/// `$XDG_CONFIG_HOME/mm`, or `~/.config/mm`.
pub fn default_config_dir(home: &Path) -> PathBuf {
    xdg_dir(std::env::var_os("XDG_CONFIG_HOME"), home, &[".config"])
}

/// Pick storage directories from explicit overrides, falling back to XDG defaults.
///
/// Returns `None` only when a default is needed and `home` is unknown.
pub fn resolve_storage_dirs(
    data_override: Option<PathBuf>,
    config_override: Option<PathBuf>,
    home: Option<&Path>,
) -> Option<StorageDirs> {
    let data_dir = match data_override {
        Some(dir) => dir,
        None => default_data_dir(home?),
    };
    let config_dir = match config_override {
        Some(dir) => dir,
        None => default_config_dir(home?),
    };
    Some(StorageDirs {
        data_dir,
        config_dir,
    })
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Merge config file values over `base`.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise keep `base`.
pub fn merge_config(base: ResolvedConfig, config_file: Option<ConfigFile>) -> ResolvedConfig {
    let Some(config) = config_file else {
        return base;
    };

    ResolvedConfig {
        time_format: config.time_format.unwrap_or(base.time_format),
        self_identity: config.self_identity.unwrap_or(base.self_identity),
        dedup_key: config.dedup_key.unwrap_or(base.dedup_key),
        log_file_path: config.log_file_path.or(base.log_file_path),
        ..base
    }
}

/// Apply environment variable overrides.
///
/// Checks for:
/// - `MMVIEW_TIME_FORMAT`: Override time format
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(time_format) = std::env::var(TIME_FORMAT_ENV) {
        config.time_format = time_format;
    }

    config
}

/// Values set explicitly on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    /// `-f/--format`.
    pub time_format: Option<String>,
    /// `--dedup-key`.
    pub dedup_key: Option<DedupKey>,
    /// `--log-file`.
    pub log_file_path: Option<PathBuf>,
}

/// Apply CLI argument overrides. CLI args have the highest precedence.
pub fn apply_cli_overrides(mut config: ResolvedConfig, overrides: CliOverrides) -> ResolvedConfig {
    if let Some(time_format) = overrides.time_format {
        config.time_format = time_format;
    }

    if let Some(dedup_key) = overrides.dedup_key {
        config.dedup_key = dedup_key;
    }

    if let Some(path) = overrides.log_file_path {
        config.log_file_path = Some(path);
    }

    config
}

/// Reject patterns chrono would fail on at render time.
///
/// chrono reports a bad specifier only when the formatted value is displayed,
/// and `to_string` panics on it, so the check has to happen up front.
pub fn validate_time_format(pattern: &str) -> Result<(), ConfigError> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::InvalidTimeFormat(pattern.to_string()));
    }
    Ok(())
}

/// Run the full precedence chain for already-chosen storage directories.
///
/// # Errors
///
/// Returns error if `config.toml` exists but cannot be read or parsed, or if
/// the resulting time format is invalid.
pub fn resolve(dirs: StorageDirs, overrides: CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    let defaults = ResolvedConfig::with_dirs(dirs);
    let config_file = load_config_file(defaults.config_file_path())?;
    let merged = merge_config(defaults, config_file);
    let with_env = apply_env_overrides(merged);
    let resolved = apply_cli_overrides(with_env, overrides);
    validate_time_format(&resolved.time_format)?;
    Ok(resolved)
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
