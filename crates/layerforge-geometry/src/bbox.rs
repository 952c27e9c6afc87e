//! Axis-aligned bounding boxes.

use crate::half_plane::HalfPlane;
use crate::interval::Interval;
use crate::line::Line;
use crate::point::Point2D;

/// Axis-aligned rectangle; empty iff either axis interval is empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: Interval,
    pub y: Interval,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingBox {
    pub const EMPTY: BoundingBox = BoundingBox {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
    };

    pub fn new(x: Interval, y: Interval) -> Self {
        Self { x, y }
    }

    /// Box spanning two opposite corners given in any order.
    pub fn from_corners(a: Point2D, b: Point2D) -> Self {
        Self::new(Interval::new(a.x, b.x), Interval::new(a.y, b.y))
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2D>) -> Self {
        points
            .into_iter()
            .fold(Self::EMPTY, |b, p| b.expand_to(*p))
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty()
    }

    pub fn expand_to(&self, p: Point2D) -> Self {
        Self::new(self.x.expand_to(p.x), self.y.expand_to(p.y))
    }

    pub fn union(&self, other: &BoundingBox) -> Self {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Self::new(self.x.union(&other.x), self.y.union(&other.y))
    }

    pub fn intersect(&self, other: &BoundingBox) -> Self {
        let b = Self::new(self.x.intersect(&other.x), self.y.intersect(&other.y));
        if b.is_empty() {
            Self::EMPTY
        } else {
            b
        }
    }

    pub fn contains(&self, p: Point2D) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y)
    }

    pub fn width(&self) -> f64 {
        self.x.length()
    }

    pub fn height(&self) -> f64 {
        self.y.length()
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn diagonal_squared(&self) -> f64 {
        self.width().powi(2) + self.height().powi(2)
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.x.mid(), self.y.mid())
    }

    /// Corners in counter-clockwise order starting bottom-left.
    pub fn corners(&self) -> [Point2D; 4] {
        [
            Point2D::new(self.x.low, self.y.low),
            Point2D::new(self.x.high, self.y.low),
            Point2D::new(self.x.high, self.y.high),
            Point2D::new(self.x.low, self.y.high),
        ]
    }

    /// Grow every side by `margin`.
    pub fn grown(&self, margin: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::new(
            Interval::new(self.x.low - margin, self.x.high + margin),
            Interval::new(self.y.low - margin, self.y.high + margin),
        )
    }

    /// Scaled about its centre by `factor`.
    pub fn swollen(&self, factor: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        let c = self.center();
        let hw = 0.5 * self.width() * factor;
        let hh = 0.5 * self.height() * factor;
        Self::new(
            Interval::new(c.x - hw, c.x + hw),
            Interval::new(c.y - hh, c.y + hh),
        )
    }

    /// The four quadrants: south-west, south-east, north-east, north-west.
    pub fn quadrants(&self) -> [BoundingBox; 4] {
        let c = self.center();
        [
            Self::new(Interval::new(self.x.low, c.x), Interval::new(self.y.low, c.y)),
            Self::new(Interval::new(c.x, self.x.high), Interval::new(self.y.low, c.y)),
            Self::new(Interval::new(c.x, self.x.high), Interval::new(c.y, self.y.high)),
            Self::new(Interval::new(self.x.low, c.x), Interval::new(c.y, self.y.high)),
        ]
    }

    /// The box as four inward-facing edge half-planes.
    pub fn edges(&self) -> Vec<HalfPlane> {
        let c = self.corners();
        (0..4)
            .filter_map(|i| HalfPlane::from_points(c[i], c[(i + 1) % 4]))
            .collect()
    }

    /// Clip `range` (parameters along `line`) to the part of the line inside
    /// this box.
    pub fn wipe(&self, line: &Line, range: Interval) -> Interval {
        if self.is_empty() {
            return Interval::EMPTY;
        }
        if self.width() == 0.0 || self.height() == 0.0 {
            return self.wipe_degenerate(line, range);
        }
        self.edges()
            .iter()
            .fold(range, |r, edge| edge.wipe(line, r))
    }

    fn wipe_degenerate(&self, line: &Line, range: Interval) -> Interval {
        let d = line.direction();
        let o = line.origin();
        let mut r = range;
        for (lo, hi, o, d) in [
            (self.x.low, self.x.high, o.x, d.x),
            (self.y.low, self.y.high, o.y, d.y),
        ] {
            if d == 0.0 {
                if o < lo || o > hi {
                    return Interval::EMPTY;
                }
            } else {
                r = r.intersect(&Interval::new((lo - o) / d, (hi - o) / d));
            }
        }
        r
    }
}
