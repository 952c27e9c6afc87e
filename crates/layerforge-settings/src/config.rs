//! Configuration for LayerForge
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats; the default location is in the platform config
//! directory.
//!
//! Configuration is organized into logical sections:
//! - Kernel tolerances (point/machine resolution, epsilon, quad-tree swell)
//! - Toolpath policy (feeds, lead-in dwell, overrun, start-point rotation)
//! - Material profiles (extrusion and infill widths)

use crate::error::{SettingsError, SettingsResult};
use layerforge_core::{Error, MaterialProfile, MaterialRegistry, Tolerances};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where each border loop starts printing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartPolicy {
    /// Keep the first point the geometry produced
    Fixed,
    /// Advance the start point by one vertex per layer
    Incremented,
    /// Pick a random vertex on every layer
    Random,
}

impl Default for StartPolicy {
    fn default() -> Self {
        Self::Incremented
    }
}

impl std::fmt::Display for StartPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Incremented => write!(f, "incremented"),
            Self::Random => write!(f, "random"),
        }
    }
}

/// Toolpath emission policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolpathSettings {
    /// Feed rate for extruding moves (mm/min)
    pub extrude_feed: f64,
    /// Feed rate for non-extruding moves (mm/min)
    pub travel_feed: f64,
    /// Extruding segments shorter than this (mm) use the short-segment feed
    pub short_segment_length: f64,
    /// Multiplier applied to `extrude_feed` for short segments
    pub short_segment_feed_factor: f64,
    /// Dwell before the first extruding move of each polygon (ms)
    pub lead_in_dwell_ms: u64,
    /// Distance to keep moving along a closed border after it is finished (mm)
    pub overrun: f64,
    /// Hatch direction on even layers, degrees from the X axis
    pub hatch_angle: f64,
    /// Rotate the hatch direction by 90 degrees on odd layers
    pub alternate_hatch: bool,
    /// Where border loops start
    pub start_policy: StartPolicy,
    /// Seed for `StartPolicy::Random`; unseeded runs use thread entropy
    pub random_seed: Option<u64>,
    /// Collinear-point removal tolerance for border loops (mm)
    pub simplify_tolerance: f64,
    /// Travel-only edges shorter than this (mm) are merged away
    pub short_edge_length: f64,
}

impl Default for ToolpathSettings {
    fn default() -> Self {
        Self {
            extrude_feed: 1800.0,
            travel_feed: 4800.0,
            short_segment_length: 2.0,
            short_segment_feed_factor: 1.5,
            lead_in_dwell_ms: 0,
            overrun: 0.5,
            hatch_angle: 0.0,
            alternate_hatch: true,
            start_policy: StartPolicy::default(),
            random_seed: None,
            simplify_tolerance: 0.02,
            short_edge_length: 0.1,
        }
    }
}

impl ToolpathSettings {
    /// Hatch direction in degrees for a given layer.
    pub fn hatch_angle_for_layer(&self, layer_index: usize) -> f64 {
        if self.alternate_hatch && layer_index % 2 == 1 {
            self.hatch_angle + 90.0
        } else {
            self.hatch_angle
        }
    }

    pub fn validate(&self) -> SettingsResult<()> {
        Error::require_positive("toolpath.extrude_feed", self.extrude_feed)?;
        Error::require_positive("toolpath.travel_feed", self.travel_feed)?;
        Error::require_positive(
            "toolpath.short_segment_feed_factor",
            self.short_segment_feed_factor,
        )?;
        if self.short_segment_length < 0.0 || self.overrun < 0.0 {
            return Err(SettingsError::invalid(
                "toolpath",
                "lengths must not be negative",
            ));
        }
        if self.simplify_tolerance < 0.0 || self.short_edge_length < 0.0 {
            return Err(SettingsError::invalid(
                "toolpath",
                "tolerances must not be negative",
            ));
        }
        if !self.hatch_angle.is_finite() {
            return Err(SettingsError::invalid("toolpath.hatch_angle", "must be finite"));
        }
        Ok(())
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Geometry kernel tolerances
    pub tolerances: Tolerances,
    /// Toolpath emission policy
    pub toolpath: ToolpathSettings,
    /// Material profiles, registered in order
    pub materials: Vec<MaterialProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tolerances: Tolerances::default(),
            toolpath: ToolpathSettings::default(),
            materials: vec![MaterialProfile::default()],
        }
    }
}

impl Config {
    /// Create new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location (`<config dir>/layerforge/config.toml`)
    pub fn default_config_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no platform config directory".to_string())
        })?;
        Ok(dir.join("layerforge").join("config.toml"))
    }

    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("{}: {}", path.display(), e))
        })?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(SettingsError::UnsupportedFormat(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from file, falling back to defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(SettingsError::UnsupportedFormat(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)
            .map_err(|e| SettingsError::SaveError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.tolerances.validate()?;
        self.toolpath.validate()?;

        if self.materials.is_empty() {
            return Err(SettingsError::invalid(
                "materials",
                "at least one material profile is required",
            ));
        }

        for (i, profile) in self.materials.iter().enumerate() {
            profile.validate()?;
            if self.materials[..i].iter().any(|p| p.name == profile.name) {
                return Err(SettingsError::invalid(
                    "materials",
                    format!("duplicate material name '{}'", profile.name),
                ));
            }
        }

        Ok(())
    }

    /// Build a registry holding every configured material profile.
    pub fn material_registry(&self) -> MaterialRegistry {
        let mut registry = MaterialRegistry::new();
        for profile in &self.materials {
            registry.register(profile.clone());
        }
        registry
    }
}
