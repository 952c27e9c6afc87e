//! Settings errors.
//!
//! Reading, writing and checking a config file can fail; every failure
//! names the file or the offending key.

use std::io;
use thiserror::Error;

/// Why a config could not be used
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Reading the file failed
    #[error("Cannot read config {0}")]
    LoadError(String),

    /// Writing the file failed
    #[error("Cannot write config {0}")]
    SaveError(String),

    /// A value is out of range or inconsistent with another
    #[error("Setting '{key}' is invalid: {reason}")]
    InvalidSetting {
        /// Dotted path of the setting, e.g. `toolpath.overrun`
        key: String,
        reason: String,
    },

    /// Neither `.json` nor `.toml`
    #[error("Unsupported config file type: {0}")]
    UnsupportedFormat(String),

    /// The platform has no per-user config directory
    #[error("No config directory: {0}")]
    ConfigDirectory(String),

    /// Tolerances or a material profile failed their own checks
    #[error("Invalid configuration: {0}")]
    Validation(#[from] layerforge_core::Error),

    #[error("Config I/O failed: {0}")]
    IoError(#[from] io::Error),

    #[error("Malformed JSON config: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Malformed TOML config: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Cannot encode config as TOML: {0}")]
    TomlSerError(#[from] toml::ser::Error),
}

impl SettingsError {
    /// Shorthand for `InvalidSetting`.
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        SettingsError::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;
