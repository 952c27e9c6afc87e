//! Slice layer input.
//!
//! A layer is the cross-section of a model at one Z height, split into
//! regions by material. Each region carries closed loops, raw edges from
//! cutting the mesh, or both.
//!
//! ```json
//! {
//!   "z": 0.2,
//!   "regions": [
//!     {
//!       "material": "default",
//!       "loops": [[{"x": 0, "y": 0}, {"x": 10, "y": 0}, {"x": 10, "y": 10}]],
//!       "edges": []
//!     }
//!   ]
//! }
//! ```

use layerforge_core::Result;
use layerforge_geometry::{Point2D, Polygon, PolygonList, SOLID_FLAG};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// One material's share of a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceRegion {
    /// Name of a material profile in the registry
    pub material: String,
    /// Closed loops, implicitly closed (last point connects to first)
    #[serde(default)]
    pub loops: Vec<Vec<Point2D>>,
    /// Unordered segments to be chained into loops
    #[serde(default)]
    pub edges: Vec<(Point2D, Point2D)>,
}

impl SliceRegion {
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            loops: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn with_loop(mut self, points: Vec<Point2D>) -> Self {
        self.loops.push(points);
        self
    }

    /// Every loop of the region, including those assembled from edges.
    /// `tolerance` is the endpoint matching distance for edge chaining.
    pub fn polygons(&self, tolerance: f64) -> PolygonList {
        let mut list = PolygonList::new();
        for points in &self.loops {
            if points.len() < 3 {
                warn!(
                    "Skipping a loop of {} points in material '{}'",
                    points.len(),
                    self.material
                );
                continue;
            }
            list.add(Polygon::from_points(points.iter().copied(), SOLID_FLAG));
        }
        if !self.edges.is_empty() {
            let assembled = PolygonList::from_edges(&self.edges, tolerance);
            debug!(
                "Assembled {} loops from {} edges",
                assembled.len(),
                self.edges.len()
            );
            list.extend(assembled);
        }
        list
    }
}

/// A sliced layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceLayer {
    /// Height of the cut (mm)
    pub z: f64,
    #[serde(default)]
    pub regions: Vec<SliceRegion>,
}

impl SliceLayer {
    pub fn new(z: f64) -> Self {
        Self {
            z,
            regions: Vec::new(),
        }
    }

    pub fn with_region(mut self, region: SliceRegion) -> Self {
        self.regions.push(region);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// All loops of every region, ignoring materials.
    pub fn polygons(&self, tolerance: f64) -> PolygonList {
        self.regions
            .iter()
            .flat_map(|r| r.polygons(tolerance))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layer_with_loops_and_edges() {
        let json = r#"{
            "z": 0.4,
            "regions": [
                {
                    "material": "default",
                    "loops": [[{"x": 0, "y": 0}, {"x": 4, "y": 0}, {"x": 4, "y": 4}, {"x": 0, "y": 4}]]
                },
                {
                    "material": "default",
                    "edges": [
                        [{"x": 10, "y": 0}, {"x": 12, "y": 0}],
                        [{"x": 11, "y": 2}, {"x": 10, "y": 0}],
                        [{"x": 12, "y": 0}, {"x": 11, "y": 2}]
                    ]
                }
            ]
        }"#;
        let layer = SliceLayer::from_json(json).unwrap();
        assert_eq!(layer.z, 0.4);
        assert_eq!(layer.regions.len(), 2);
        assert!(layer.regions[1].loops.is_empty());

        let loops = layer.polygons(0.01);
        assert_eq!(loops.len(), 2);
        assert!((loops.polygons()[0].area() - 16.0).abs() < 1e-12);
        assert!((loops.polygons()[1].area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_loops_are_skipped() {
        let region = SliceRegion::new("default")
            .with_loop(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]);
        assert!(region.polygons(0.01).is_empty());
    }

    #[test]
    fn test_bad_json_is_an_error() {
        let err = SliceLayer::from_json("{\"regions\": []}").unwrap_err();
        assert!(matches!(err, layerforge_core::Error::Json(_)));
    }
}
