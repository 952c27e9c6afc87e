//! # LayerForge
//!
//! A 2D constructive-solid-geometry kernel and layer toolpath generator for
//! 3D-printer slicing. Each sliced layer's loops become a boolean expression
//! over half-planes; the expression is shrunk, subdivided with a quad-tree
//! and swept to produce border loops and hatch infill.
//!
//! ## Architecture
//!
//! LayerForge is organized as a workspace with multiple crates:
//!
//! 1. **layerforge-core** - Error type, tolerances, material registry
//! 2. **layerforge-settings** - Configuration files (JSON/TOML)
//! 3. **layerforge-geometry** - Half-planes, CSG arena, decomposition,
//!    quad-tree divide, hatching and border tracing
//! 4. **layerforge-toolpath** - Per-layer border/hatch emission
//! 5. **layerforge** - CLI binary that integrates all crates

pub use layerforge_core::{Error, MaterialId, MaterialProfile, MaterialRegistry, Result, Tolerances};
pub use layerforge_geometry::{
    Attributes, BoundingBox, CsgArena, CsgId, CsgOp, CsgPolygon, HalfPlane, Interval, Line,
    Point2D, Polygon, PolygonList, GAP_FLAG, SOLID_FLAG,
};
pub use layerforge_settings::{Config, SettingsError, StartPolicy, ToolpathSettings};
pub use layerforge_toolpath::{
    LayerProcessor, LayerToolpath, SliceLayer, SliceRegion, ToolpathSegment, ToolpathSegmentType,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Date `build.rs` stamped into this binary
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Log to stderr in plain text. `RUST_LOG` picks the levels; without it
/// everything at INFO and above is shown.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Initialize logging as one JSON object per line on stderr, for batch runs
/// whose logs are collected by another tool.
pub fn init_json_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let fmt_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_current_span(false);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
}
