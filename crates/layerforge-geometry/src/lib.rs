//! # LayerForge Geometry
//!
//! The 2D kernel behind layer toolpaths: regions are boolean expressions
//! over half-planes, built from polygon loops and turned back into border
//! loops and hatch lines.
//!
//! ## Core Components
//!
//! ### Primitives
//! - **Point2D / Interval / BoundingBox / Line**: vector algebra, interval
//!   arithmetic for conservative box tests, parametric lines
//! - **HalfPlane**: `normal . p + constant <= 0`, plus the crossing workspace
//!   used while sweeping lines through a region
//!
//! ### Regions
//! - **CsgArena**: owns every half-plane and boolean node of one slicing pass;
//!   nodes are immutable and addressed by `CsgId`
//! - **decompose**: simple polygon to CSG (Tang & Woo)
//! - **CsgPolygon**: quad-tree subdivision, hatching and border tracing
//!
//! ### Paths
//! - **Polygon / PolygonList**: flagged point loops, simplification,
//!   travel ordering, nesting resolution, SVG output
//!
//! ## Pipeline
//!
//! ```text
//! edge soup ──> PolygonList::from_edges ──> resolve_insides ──> CsgId
//!                                                                │
//!                 ┌──────────── offset(-0.5 w) ──────────────────┤
//!                 ▼                                              ▼
//!        divide + border                               offset(-1.5 w)
//!                 │                                     divide + hatch
//!                 ▼                                              ▼
//!           border loops                                   hatch chains
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use layerforge_geometry::{CsgArena, CsgPolygon, Point2D, Polygon, SOLID_FLAG};
//! use layerforge_core::Tolerances;
//!
//! let mut arena = CsgArena::new(Tolerances::default());
//! let square = Polygon::from_points(
//!     [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)].map(|(x, y)| Point2D::new(x, y)),
//!     SOLID_FLAG,
//! );
//! let csg = square.to_csg(&mut arena);
//! let mut inset = CsgPolygon::new(csg, square.bounds()).offset(&mut arena, -0.25);
//! inset.divide(&mut arena, 1.0e-4, 1.01);
//! let border = inset.border(&arena, SOLID_FLAG);
//! ```

pub mod bbox;
pub mod crossing;
pub mod csg;
pub mod csg_polygon;
pub mod decompose;
pub mod half_plane;
pub mod interval;
pub mod line;
pub mod point;
pub mod polygon;
pub mod polygon_list;

pub use bbox::BoundingBox;
pub use crossing::LineIntersection;
pub use csg::{CsgArena, CsgId, CsgOp, PlaneId};
pub use csg_polygon::{CsgPolygon, QuadContents};
pub use decompose::{convex_hull, decompose, signed_area};
pub use half_plane::HalfPlane;
pub use interval::Interval;
pub use line::Line;
pub use point::Point2D;
pub use polygon::{Attributes, Polygon, GAP_FLAG, SOLID_FLAG};
pub use polygon_list::PolygonList;
