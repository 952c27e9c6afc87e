//! # Layer Processing
//!
//! Turns one sliced layer into machine motion:
//! - Groups the layer's loops by material and resolves holes into one CSG
//!   expression per material
//! - Traces the border half an extrusion width inside the material edge
//! - Hatches the region a further extrusion width inside the border
//! - Orders everything to shorten travel and emits travel, extrude and
//!   dwell segments
//!
//! Every call builds its own `CsgArena`, so layers can be processed on
//! separate threads with a shared `LayerProcessor`.

use crate::segment::ToolpathSegment;
use crate::slice::SliceLayer;
use layerforge_core::{Error, MaterialId, MaterialProfile, MaterialRegistry, Result, Tolerances};
use layerforge_geometry::{
    Attributes, CsgArena, CsgId, CsgPolygon, Point2D, Polygon, PolygonList, GAP_FLAG, SOLID_FLAG,
};
use layerforge_settings::{Config, StartPolicy, ToolpathSettings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// The toolpath of one layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerToolpath {
    /// Position of the layer in the print, counting from zero
    pub index: usize,
    /// Height of the layer (mm)
    pub z: f64,
    pub segments: Vec<ToolpathSegment>,
    /// Border loops in print order
    #[serde(skip)]
    pub borders: PolygonList,
    /// Hatch chains in print order
    #[serde(skip)]
    pub hatches: PolygonList,
}

impl LayerToolpath {
    pub fn new(index: usize, z: f64) -> Self {
        Self {
            index,
            z,
            ..Self::default()
        }
    }

    pub fn add_segment(&mut self, segment: ToolpathSegment) {
        self.segments.push(segment);
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total length of extruding moves (mm).
    pub fn extrude_length(&self) -> f64 {
        self.segments
            .iter()
            .filter(|s| s.is_extrude())
            .map(ToolpathSegment::length)
            .sum()
    }

    /// Total length of non-extruding moves (mm).
    pub fn travel_length(&self) -> f64 {
        self.segments
            .iter()
            .filter(|s| s.is_travel())
            .map(ToolpathSegment::length)
            .sum()
    }

    pub fn dwell_time_ms(&self) -> u64 {
        self.segments.iter().filter_map(|s| s.dwell_ms).sum()
    }

    /// Borders and hatches together, for inspection.
    pub fn outlines(&self) -> PolygonList {
        self.borders
            .iter()
            .chain(self.hatches.iter())
            .cloned()
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Converts slice layers to toolpaths
#[derive(Debug, Clone)]
pub struct LayerProcessor {
    tolerances: Tolerances,
    settings: ToolpathSettings,
    materials: MaterialRegistry,
}

impl LayerProcessor {
    pub fn new(
        tolerances: Tolerances,
        settings: ToolpathSettings,
        materials: MaterialRegistry,
    ) -> Self {
        Self {
            tolerances,
            settings,
            materials,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.tolerances,
            config.toolpath.clone(),
            config.material_registry(),
        )
    }

    pub fn settings(&self) -> &ToolpathSettings {
        &self.settings
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    /// Process a single layer. Regions whose geometry degenerates produce no
    /// segments; an unknown material name or an invalid profile is an error.
    pub fn process_layer(&self, index: usize, layer: &SliceLayer) -> Result<LayerToolpath> {
        info!("Processing layer {} at Z={}", index, layer.z);
        if !layer.z.is_finite() {
            return Err(Error::invalid_parameter("z", layer.z, "must be finite"));
        }

        let groups = self.group_by_material(layer)?;
        let mut toolpath = LayerToolpath::new(index, layer.z);
        if groups.is_empty() {
            warn!("Empty layer at Z={}, skipping", layer.z);
            return Ok(toolpath);
        }

        let mut arena = CsgArena::new(self.tolerances);
        let mut rng = self.layer_rng(index);
        let mut cursor = None;

        for (material, loops) in &groups {
            let profile = self.materials.get(*material)?;
            profile.validate()?;

            let csg = loops.resolve_insides(&mut arena);
            if csg == CsgId::NULL {
                warn!(
                    "Material '{}' has no area on layer {}, skipping",
                    profile.name, index
                );
                continue;
            }
            let base = CsgPolygon::new(csg, loops.bounds());
            let fallback = Attributes {
                material: *material,
                solid: 0,
            };

            let borders = self.borders(&mut arena, &base, profile, index, &mut rng);
            let borders = inherit(borders, loops, fallback);
            let hatches = inherit(self.hatches(&mut arena, &base, profile, index), loops, fallback);
            debug!(
                "Material '{}': {} border loops, {} hatch chains",
                profile.name,
                borders.len(),
                hatches.len()
            );

            for polygon in &borders {
                self.emit(&mut toolpath.segments, &mut cursor, polygon, true);
            }
            for polygon in &hatches {
                self.emit(&mut toolpath.segments, &mut cursor, polygon, false);
            }
            toolpath.borders.extend(borders);
            toolpath.hatches.extend(hatches);
        }

        info!(
            "Layer {}: {} segments, {:.2} mm extruded, {:.2} mm travel",
            index,
            toolpath.segment_count(),
            toolpath.extrude_length(),
            toolpath.travel_length()
        );
        Ok(toolpath)
    }

    fn group_by_material(&self, layer: &SliceLayer) -> Result<BTreeMap<MaterialId, PolygonList>> {
        let mut groups: BTreeMap<MaterialId, PolygonList> = BTreeMap::new();
        for (i, region) in layer.regions.iter().enumerate() {
            let material = self.materials.find_by_name(&region.material).ok_or_else(|| {
                Error::other(format!(
                    "Unknown material '{}' in region {}",
                    region.material, i
                ))
            })?;
            let loops = region.polygons(self.tolerances.point_resolution);
            if loops.is_empty() {
                warn!("Region {} ('{}') has no closed loops", i, region.material);
                continue;
            }
            let attributes = Attributes {
                material,
                solid: i as u32,
            };
            groups
                .entry(material)
                .or_default()
                .extend(tag(loops, attributes));
        }
        Ok(groups)
    }

    fn layer_rng(&self, index: usize) -> StdRng {
        match self.settings.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        }
    }

    fn borders(
        &self,
        arena: &mut CsgArena,
        base: &CsgPolygon,
        profile: &MaterialProfile,
        index: usize,
        rng: &mut StdRng,
    ) -> PolygonList {
        let mut region = base.offset(arena, profile.border_offset());
        region.divide(arena, self.tolerances.resolution_squared(), self.tolerances.swell);
        let loops = region
            .border(arena, SOLID_FLAG)
            .simplify(self.settings.simplify_tolerance);

        let started: PolygonList = loops
            .into_iter()
            .map(|p| match self.settings.start_policy {
                StartPolicy::Fixed => p,
                StartPolicy::Incremented => p.incremented_start(index),
                StartPolicy::Random => p.randomly_rotated(&mut *rng),
            })
            .collect();
        started.near_ends()
    }

    fn hatches(
        &self,
        arena: &mut CsgArena,
        base: &CsgPolygon,
        profile: &MaterialProfile,
        index: usize,
    ) -> PolygonList {
        let mut region = base.offset(arena, profile.hatch_offset());
        region.divide(arena, self.tolerances.resolution_squared(), self.tolerances.swell);
        let direction = Point2D::from_angle(self.settings.hatch_angle_for_layer(index));
        region
            .hatch(arena, direction, profile.infill_width, SOLID_FLAG, GAP_FLAG)
            .filter_shorts(self.settings.short_edge_length)
            .near_ends()
    }

    fn extrude_feed(&self, length: f64) -> f64 {
        if length < self.settings.short_segment_length {
            self.settings.extrude_feed * self.settings.short_segment_feed_factor
        } else {
            self.settings.extrude_feed
        }
    }

    /// Append the moves for one polygon. Closed polygons include the edge
    /// back to the start and finish with the overrun; open chains stop at
    /// their last point.
    fn emit(
        &self,
        segments: &mut Vec<ToolpathSegment>,
        cursor: &mut Option<Point2D>,
        polygon: &Polygon,
        closed: bool,
    ) {
        let Some(first) = polygon.first() else {
            return;
        };
        let travel_feed = self.settings.travel_feed;

        if let Some(at) = *cursor {
            if at != first {
                segments.push(ToolpathSegment::travel(at, first, travel_feed));
            }
        }
        if self.settings.lead_in_dwell_ms > 0 {
            segments.push(ToolpathSegment::dwell(first, self.settings.lead_in_dwell_ms));
        }

        let edges: Vec<(Point2D, Point2D, i32)> = if closed {
            polygon.edges().collect()
        } else {
            polygon
                .points()
                .windows(2)
                .zip(polygon.flags())
                .map(|(w, &flag)| (w[0], w[1], flag))
                .collect()
        };
        for (a, b, flag) in edges {
            if a == b {
                continue;
            }
            if flag == GAP_FLAG {
                segments.push(ToolpathSegment::travel(a, b, travel_feed));
            } else {
                let feed = self.extrude_feed(a.distance_to(&b));
                segments.push(ToolpathSegment::extrude(a, b, feed));
            }
        }

        let mut end = if closed {
            first
        } else {
            polygon.last().unwrap_or(first)
        };
        if closed && self.settings.overrun > 0.0 && polygon.len() > 1 {
            let next = polygon.point(1);
            let length = first.distance_to(&next);
            if length > 0.0 {
                let stop = first.lerp(next, (self.settings.overrun / length).min(1.0));
                segments.push(ToolpathSegment::travel(first, stop, travel_feed));
                end = stop;
            }
        }
        *cursor = Some(end);
    }
}

/// Give each output polygon the attributes of the input loop nearest to its
/// start point, so it remembers which region it came from.
fn inherit(list: PolygonList, sources: &PolygonList, fallback: Attributes) -> PolygonList {
    list.into_iter()
        .map(|mut p| {
            let attributes = p
                .points()
                .first()
                .and_then(|&start| nearest_source(sources, start))
                .unwrap_or(fallback);
            p.set_attributes(Some(attributes));
            p
        })
        .collect()
}

fn nearest_source(sources: &PolygonList, p: Point2D) -> Option<Attributes> {
    sources
        .iter()
        .filter_map(|source| {
            let d = source
                .edges()
                .map(|(a, b, _)| p.distance_to_segment(a, b))
                .fold(f64::INFINITY, f64::min);
            source.attributes().map(|a| (d, a))
        })
        .min_by(|x, y| x.0.total_cmp(&y.0))
        .map(|(_, a)| a)
}

fn tag(list: PolygonList, attributes: Attributes) -> PolygonList {
    list.into_iter()
        .map(|mut p| {
            p.set_attributes(Some(attributes));
            p
        })
        .collect()
}
