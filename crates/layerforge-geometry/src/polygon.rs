//! Flagged polygon loops.
//!
//! A polygon is an ordered, implicitly closed point sequence. Every point
//! carries an integer flag that classifies the edge *leaving* it: `GAP_FLAG`
//! marks a travel-only edge, anything else is printed material. Hatch chains
//! use the same type; their closing edge is simply never emitted.

use crate::bbox::BoundingBox;
use crate::csg::{CsgArena, CsgId};
use crate::decompose::{decompose, signed_area};
use crate::point::Point2D;
use layerforge_core::MaterialId;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Flag for edges that move without printing.
pub const GAP_FLAG: i32 = 0;

/// Default flag for printed edges.
pub const SOLID_FLAG: i32 = 1;

/// Which material and which solid a polygon belongs to. A handle into the
/// material registry, never an owned copy of the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attributes {
    pub material: MaterialId,
    /// Index of the parent solid in the sliced model
    pub solid: u32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    points: Vec<Point2D>,
    flags: Vec<i32>,
    bounds: BoundingBox,
    attributes: Option<Attributes>,
}

impl Polygon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attributes(attributes: Attributes) -> Self {
        Self {
            attributes: Some(attributes),
            ..Self::default()
        }
    }

    /// A polygon with every edge carrying the same flag.
    pub fn from_points(points: impl IntoIterator<Item = Point2D>, flag: i32) -> Self {
        let mut polygon = Self::new();
        for p in points {
            polygon.add(p, flag);
        }
        polygon
    }

    /// Append a point; `flag` classifies the edge from it to the next point.
    pub fn add(&mut self, point: Point2D, flag: i32) {
        self.bounds = self.bounds.expand_to(point);
        self.points.push(point);
        self.flags.push(flag);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn flags(&self) -> &[i32] {
        &self.flags
    }

    pub fn point(&self, i: usize) -> Point2D {
        self.points[i]
    }

    pub fn flag(&self, i: usize) -> i32 {
        self.flags[i]
    }

    pub fn first(&self) -> Option<Point2D> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point2D> {
        self.points.last().copied()
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn attributes(&self) -> Option<Attributes> {
        self.attributes
    }

    pub fn set_attributes(&mut self, attributes: Option<Attributes>) {
        self.attributes = attributes;
    }

    /// Positive for counter-clockwise loops.
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Edges as `(from, to, flag)`, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point2D, Point2D, i32)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n], self.flags[i]))
    }

    /// Total length of the open chain (without the closing edge).
    pub fn chain_length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
    }

    pub fn perimeter(&self) -> f64 {
        self.edges().map(|(a, b, _)| a.distance_to(&b)).sum()
    }

    /// Opposite traversal direction. Each flag stays with its edge.
    pub fn reversed(&self) -> Polygon {
        let n = self.points.len();
        let mut out = Polygon {
            attributes: self.attributes,
            ..Polygon::default()
        };
        for j in 0..n {
            let flag = if j + 1 < n {
                self.flags[n - 2 - j]
            } else {
                self.flags[n - 1]
            };
            out.add(self.points[n - 1 - j], flag);
        }
        out
    }

    /// Same loop starting at point `start`.
    pub fn rotated(&self, start: usize) -> Polygon {
        let mut out = self.clone();
        if !self.points.is_empty() {
            let k = start % self.points.len();
            out.points.rotate_left(k);
            out.flags.rotate_left(k);
        }
        out
    }

    /// Start moved forward by one vertex per layer, so seams do not stack.
    pub fn incremented_start(&self, layer: usize) -> Polygon {
        match self.points.len() {
            0 => self.clone(),
            n => self.rotated(layer % n),
        }
    }

    pub fn randomly_rotated<R: Rng + ?Sized>(&self, rng: &mut R) -> Polygon {
        match self.points.len() {
            0 => self.clone(),
            n => self.rotated(rng.gen_range(0..n)),
        }
    }

    /// Remove points that deviate less than `d` from the chord between the
    /// last kept point and the next point. Points are only merged across
    /// edges of the same flag. Polygons whose box diagonal is within
    /// `sqrt(2) * d` vanish entirely.
    pub fn simplify(&self, d: f64) -> Option<Polygon> {
        if self.bounds.is_empty() || self.bounds.diagonal_squared() <= 2.0 * d * d {
            trace!("simplify dropped a polygon of {} points", self.len());
            return None;
        }
        let n = self.points.len();
        let mut out = Polygon {
            attributes: self.attributes,
            ..Polygon::default()
        };
        out.add(self.points[0], self.flags[0]);

        let mut anchor = 0;
        for i in 1..n {
            let next = self.points[(i + 1) % n];
            let chord_start = self.points[anchor];
            let removable = self.flags[i] == self.flags[anchor]
                && (anchor + 1..=i)
                    .all(|j| self.points[j].distance_to_segment(chord_start, next) < d);
            if !removable {
                out.add(self.points[i], self.flags[i]);
                anchor = i;
            }
        }

        if out.len() < 2 {
            return None;
        }
        Some(out)
    }

    /// Merge away gap edges shorter than `tiny` whose neighbouring edges are
    /// also gaps, until nothing changes. A polygon with no printed edge left
    /// is dropped.
    pub fn filter_shorts(&self, tiny: f64) -> Option<Polygon> {
        let mut points = self.points.clone();
        let mut flags = self.flags.clone();

        loop {
            let n = points.len();
            if n < 3 {
                break;
            }
            let short = (0..n).find(|&i| {
                let prev = (i + n - 1) % n;
                let next = (i + 1) % n;
                flags[i] == GAP_FLAG
                    && flags[prev] == GAP_FLAG
                    && flags[next] == GAP_FLAG
                    && points[i].distance_to(&points[next]) < tiny
            });
            let Some(i) = short else {
                break;
            };
            let remove = if i + 1 < n { i + 1 } else { i };
            points.remove(remove);
            flags.remove(remove);
        }

        if points.len() < 2 || flags.iter().all(|&f| f == GAP_FLAG) {
            return None;
        }
        let mut out = Polygon {
            attributes: self.attributes,
            ..Polygon::default()
        };
        for (p, f) in points.into_iter().zip(flags) {
            out.add(p, f);
        }
        Some(out)
    }

    /// CSG expression for the region this loop encloses.
    pub fn to_csg(&self, arena: &mut CsgArena) -> CsgId {
        decompose(arena, &self.points)
    }
}
