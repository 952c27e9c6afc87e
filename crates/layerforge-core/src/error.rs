//! Error handling for LayerForge
//!
//! Geometry operations themselves never fail: degenerate input is logged and
//! produces an empty (NULL) result. The error type here covers the edges of
//! the system:
//! - Parameter validation (non-positive widths, spacings, tolerances)
//! - Material registry lookups
//! - File and JSON I/O
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::materials::MaterialId;
use thiserror::Error;

/// Unified error type for LayerForge crates
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry that cannot be processed at all (as opposed to geometry that
    /// merely degenerates to nothing)
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// A numeric parameter was outside its valid range
    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        /// The parameter name.
        name: String,
        /// The rejected value.
        value: f64,
        /// Why the value was rejected.
        reason: String,
    },

    /// A polygon referenced a material the registry does not know
    #[error("Unknown material: {0}")]
    UnknownMaterial(MaterialId),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(name: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Require `value > 0` and finite, naming the parameter on failure.
    pub fn require_positive(name: &str, value: f64) -> Result<f64> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(Self::invalid_parameter(name, value, "must be a positive finite number"))
        }
    }

    /// Check if this is a parameter validation error
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Error::InvalidParameter { .. })
    }

    /// Check if this is a material lookup error
    pub fn is_unknown_material(&self) -> bool {
        matches!(self, Error::UnknownMaterial(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_parameter("spacing", -1.0, "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'spacing' = -1: must be positive"
        );

        let err = Error::UnknownMaterial(MaterialId(7));
        assert_eq!(err.to_string(), "Unknown material: material#7");

        let err = Error::other("boom");
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_require_positive() {
        assert_eq!(Error::require_positive("width", 0.4).ok(), Some(0.4));
        assert!(Error::require_positive("width", 0.0).is_err());
        assert!(Error::require_positive("width", f64::NAN).is_err());
        assert!(Error::require_positive("width", f64::INFINITY).is_err());
    }

    #[test]
    fn test_error_predicates() {
        assert!(Error::invalid_parameter("x", 0.0, "zero").is_invalid_parameter());
        assert!(Error::UnknownMaterial(MaterialId(1)).is_unknown_material());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
