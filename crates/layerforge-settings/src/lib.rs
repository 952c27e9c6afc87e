//! LayerForge Settings Crate
//!
//! Handles configuration files: kernel tolerances, toolpath policy and
//! material profiles.

pub mod config;
pub mod error;

pub use config::{Config, StartPolicy, ToolpathSettings};
pub use error::{SettingsError, SettingsResult};
