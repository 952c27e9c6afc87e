//! # LayerForge Toolpath
//!
//! Converts sliced layers into ordered machine moves.
//!
//! ## Features
//! - Per-material border and hatch generation on top of the CSG kernel
//! - Hatch direction alternating between layers
//! - Start-point rotation so seams do not stack (fixed, incremented, random)
//! - Lead-in dwell, border overrun and short-segment feed adjustment
//! - JSON output of the emitted segments

pub mod layer;
pub mod segment;
pub mod slice;

pub use layer::{LayerProcessor, LayerToolpath};
pub use segment::{ToolpathSegment, ToolpathSegmentType};
pub use slice::{SliceLayer, SliceRegion};
