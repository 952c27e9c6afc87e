//! Numeric tolerances shared by every geometry comparison.
//!
//! A single `Tolerances` value is owned by each geometry arena and passed
//! through to every "is this on the boundary" test, so the hull decomposition
//! and the line sweep always agree on what counts as zero.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tolerance set derived from the machine's mechanical resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Distance below which two points are considered coincident (mm)
    pub point_resolution: f64,
    /// Smallest feature the machine can reproduce (mm); quad-tree cells stop
    /// subdividing below this size
    pub machine_resolution: f64,
    /// Small-number epsilon for direction and determinant comparisons
    pub tiny: f64,
    /// Factor by which quad-tree cell boxes are over-grown so crossings on a
    /// shared cell edge are seen from both sides
    pub swell: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            point_resolution: 0.01,
            machine_resolution: 0.1,
            tiny: 1.0e-9,
            swell: 1.01,
        }
    }
}

impl Tolerances {
    /// Build a tolerance set from a machine resolution, deriving the point
    /// resolution as a tenth of it.
    pub fn from_machine_resolution(machine_resolution: f64) -> Self {
        Self {
            point_resolution: machine_resolution * 0.1,
            machine_resolution,
            ..Self::default()
        }
    }

    /// Squared machine resolution, the area floor for quad-tree cells.
    pub fn resolution_squared(&self) -> f64 {
        self.machine_resolution * self.machine_resolution
    }

    pub fn validate(&self) -> Result<()> {
        Error::require_positive("point_resolution", self.point_resolution)?;
        Error::require_positive("machine_resolution", self.machine_resolution)?;
        Error::require_positive("tiny", self.tiny)?;

        if !(self.swell.is_finite() && self.swell >= 1.0) {
            return Err(Error::invalid_parameter(
                "swell",
                self.swell,
                "must be at least 1.0",
            ));
        }

        if self.point_resolution > self.machine_resolution {
            return Err(Error::invalid_parameter(
                "point_resolution",
                self.point_resolution,
                "must not exceed machine_resolution",
            ));
        }

        Ok(())
    }
}
