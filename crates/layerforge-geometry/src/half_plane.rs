//! Oriented half-planes, the leaves of every CSG expression.
//!
//! A half-plane is `normal . p + constant <= 0`. Built from two points
//! `a -> b`, the inside is to the left, so the edges of a counter-clockwise
//! polygon all face outward. The boundary line always runs in the direction
//! `normal.orthogonal()`, which is `a -> b` for planes built from points.

use crate::bbox::BoundingBox;
use crate::crossing::LineIntersection;
use crate::interval::Interval;
use crate::line::Line;
use crate::point::Point2D;
use layerforge_core::Tolerances;

#[derive(Debug, Clone)]
pub struct HalfPlane {
    normal: Point2D,
    constant: f64,
    line: Line,
    pub(crate) crossings: Vec<LineIntersection>,
}

impl HalfPlane {
    /// Half-plane to the left of `a -> b`. Returns `None` when the points
    /// coincide.
    pub fn from_points(a: Point2D, b: Point2D) -> Option<Self> {
        let direction = (b - a).normalized()?;
        let normal = Point2D::new(direction.y, -direction.x);
        Some(Self {
            normal,
            constant: -normal.dot(a),
            line: Line::new(a, direction),
            crossings: Vec::new(),
        })
    }

    /// Half-plane to the left of a parametric line.
    pub fn from_line(line: &Line) -> Option<Self> {
        Self::from_points(line.origin(), line.origin() + line.direction())
    }

    /// Unit outward normal
    pub fn normal(&self) -> Point2D {
        self.normal
    }

    /// The constant term of `normal . p + constant`
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Boundary line, unit speed, running along the boundary with the inside
    /// on its left.
    pub fn line(&self) -> &Line {
        &self.line
    }

    /// Signed distance of `p`; negative inside.
    pub fn value(&self, p: Point2D) -> f64 {
        self.normal.dot(p) + self.constant
    }

    /// Bounds of `value` over a box, by interval arithmetic.
    pub fn value_box(&self, b: &BoundingBox) -> Interval {
        if b.is_empty() {
            return Interval::EMPTY;
        }
        b.x * self.normal.x + b.y * self.normal.y + self.constant
    }

    /// The complementary half-plane, sharing the same boundary.
    pub fn negated(&self) -> HalfPlane {
        HalfPlane {
            normal: -self.normal,
            constant: -self.constant,
            line: self.line.reversed(),
            crossings: Vec::new(),
        }
    }

    /// Parallel half-plane moved `d` along the normal. Negative `d` shrinks
    /// the inside.
    pub fn offset(&self, d: f64) -> HalfPlane {
        HalfPlane {
            normal: self.normal,
            constant: self.constant - d,
            line: self.line.translated(self.normal * d),
            crossings: Vec::new(),
        }
    }

    /// Same boundary and orientation, within tolerance.
    pub fn same(&self, other: &HalfPlane, tol: &Tolerances) -> bool {
        (self.normal - other.normal).length() <= tol.tiny
            && (self.constant - other.constant).abs() <= tol.point_resolution
    }

    /// Parameter along this plane's line where it meets `other`'s boundary.
    pub fn crossing_t(&self, other: &HalfPlane) -> Option<f64> {
        self.line.crossing_t(other)
    }

    /// Restrict `range` (parameters along `line`) to where `line` is inside
    /// this half-plane.
    pub fn wipe(&self, line: &Line, range: Interval) -> Interval {
        if range.is_empty() {
            return range;
        }
        let v0 = self.value(line.origin());
        let rate = self.normal.dot(line.direction());
        match line.crossing_t(self) {
            None if v0 > 0.0 => Interval::EMPTY,
            None => range,
            Some(t) if rate > 0.0 => range.intersect(&Interval {
                low: f64::NEG_INFINITY,
                high: t,
            }),
            Some(t) => range.intersect(&Interval {
                low: t,
                high: f64::INFINITY,
            }),
        }
    }
}
