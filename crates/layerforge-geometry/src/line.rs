//! Parametric lines.

use crate::half_plane::HalfPlane;
use crate::point::Point2D;

/// Determinants below this are treated as parallel.
const PARALLEL_EPSILON: f64 = 1.0e-12;

/// `point(t) = origin + t * direction`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    origin: Point2D,
    direction: Point2D,
}

impl Line {
    pub fn new(origin: Point2D, direction: Point2D) -> Self {
        Self { origin, direction }
    }

    /// Line through `a` (t = 0) and `b` (t = 1).
    pub fn from_points(a: Point2D, b: Point2D) -> Self {
        Self::new(a, b - a)
    }

    pub fn origin(&self) -> Point2D {
        self.origin
    }

    pub fn direction(&self) -> Point2D {
        self.direction
    }

    pub fn point(&self, t: f64) -> Point2D {
        self.origin + self.direction * t
    }

    /// Parameter of the point on the line closest to `p`.
    pub fn nearest_t(&self, p: Point2D) -> f64 {
        let len2 = self.direction.length_squared();
        if len2 <= PARALLEL_EPSILON {
            return 0.0;
        }
        (p - self.origin).dot(self.direction) / len2
    }

    /// Same points, opposite direction.
    pub fn reversed(&self) -> Line {
        Line::new(self.origin, -self.direction)
    }

    /// Moved by `delta` without changing direction.
    pub fn translated(&self, delta: Point2D) -> Line {
        Line::new(self.origin + delta, self.direction)
    }

    /// Parameter at which this line crosses the boundary of `plane`, or
    /// `None` when the two are parallel.
    pub fn crossing_t(&self, plane: &HalfPlane) -> Option<f64> {
        let rate = plane.normal().dot(self.direction);
        if rate.abs() <= PARALLEL_EPSILON {
            return None;
        }
        Some(-plane.value(self.origin) / rate)
    }
}
