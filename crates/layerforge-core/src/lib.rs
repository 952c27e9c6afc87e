//! # LayerForge Core
//!
//! Core types shared across the LayerForge workspace:
//! - The unified error type
//! - Numeric tolerances threaded through the geometry kernel
//! - The material registry consulted for extrusion widths

pub mod error;
pub mod materials;
pub mod tolerance;

pub use error::{Error, Result};
pub use materials::{MaterialId, MaterialProfile, MaterialRegistry};
pub use tolerance::Tolerances;
