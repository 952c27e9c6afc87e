//! Material registry module
//!
//! This module provides:
//! - Material identifiers (copyable handles into the registry)
//! - Extrusion profiles (extrusion width, infill line spacing)
//! - Registry management (register, lookup by id or name, removal)
//!
//! Polygons never own their material; they carry a `MaterialId` and the
//! layer processor resolves it against the registry when it needs widths.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Material identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

impl std::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "material#{}", self.0)
    }
}

/// Extrusion parameters for one printable material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProfile {
    /// Human-readable name, unique within a registry
    pub name: String,
    /// Width of one extruded bead (mm)
    pub extrusion_width: f64,
    /// Spacing between infill hatch lines (mm)
    pub infill_width: f64,
}

impl MaterialProfile {
    pub fn new(name: impl Into<String>, extrusion_width: f64, infill_width: f64) -> Self {
        Self {
            name: name.into(),
            extrusion_width,
            infill_width,
        }
    }

    /// Offset of the border path from the solid's edge.
    pub fn border_offset(&self) -> f64 {
        -0.5 * self.extrusion_width
    }

    /// Offset of the hatch region boundary from the solid's edge.
    pub fn hatch_offset(&self) -> f64 {
        -1.5 * self.extrusion_width
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::other("Material name must not be empty"));
        }
        Error::require_positive("extrusion_width", self.extrusion_width)?;
        Error::require_positive("infill_width", self.infill_width)?;
        Ok(())
    }
}

impl Default for MaterialProfile {
    fn default() -> Self {
        Self::new("default", 0.4, 0.8)
    }
}

/// Registry of material profiles keyed by handle
#[derive(Debug, Clone, Default)]
pub struct MaterialRegistry {
    profiles: HashMap<MaterialId, MaterialProfile>,
    next_id: u32,
}

impl MaterialRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile and return its handle. Registering a name that is
    /// already present replaces that profile and keeps its handle.
    pub fn register(&mut self, profile: MaterialProfile) -> MaterialId {
        if let Some(id) = self.find_by_name(&profile.name) {
            debug!("Replacing material profile '{}' ({})", profile.name, id);
            self.profiles.insert(id, profile);
            return id;
        }

        let id = MaterialId(self.next_id);
        self.next_id += 1;
        self.profiles.insert(id, profile);
        id
    }

    /// Get a profile by handle
    pub fn get(&self, id: MaterialId) -> Result<&MaterialProfile> {
        self.profiles.get(&id).ok_or(Error::UnknownMaterial(id))
    }

    /// Look up a handle by profile name (exact match)
    pub fn find_by_name(&self, name: &str) -> Option<MaterialId> {
        self.profiles
            .iter()
            .find(|(_, p)| p.name == name)
            .map(|(id, _)| *id)
    }

    /// Remove a profile from the registry
    pub fn remove(&mut self, id: MaterialId) -> Option<MaterialProfile> {
        self.profiles.remove(&id)
    }

    /// All profiles, ordered by handle
    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &MaterialProfile)> {
        let mut entries: Vec<_> = self.profiles.iter().map(|(id, p)| (*id, p)).collect();
        entries.sort_by_key(|(id, _)| *id);
        entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
