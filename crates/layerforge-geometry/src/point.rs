//! 2D point and vector algebra.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A 2D point or vector. Always copied, never shared.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    /// Creates a new point with the given X and Y coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector at `angle_deg` degrees from the X axis.
    pub fn from_angle(angle_deg: f64) -> Self {
        let a = angle_deg.to_radians();
        Self::new(a.cos(), a.sin())
    }

    pub fn dot(self, other: Point2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product.
    pub fn cross(self, other: Point2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Calculates the distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        (*self - *other).length()
    }

    pub fn distance_squared_to(&self, other: &Point2D) -> f64 {
        (*self - *other).length_squared()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Point2D> {
        let len = self.length();
        if len > f64::EPSILON {
            Some(self / len)
        } else {
            None
        }
    }

    /// The vector rotated a quarter turn counter-clockwise.
    pub fn orthogonal(self) -> Point2D {
        Point2D::new(-self.y, self.x)
    }

    pub fn lerp(self, other: Point2D, t: f64) -> Point2D {
        self + (other - self) * t
    }

    pub fn midpoint(self, other: Point2D) -> Point2D {
        self.lerp(other, 0.5)
    }

    /// Distance from this point to the closed segment `a`-`b`.
    pub fn distance_to_segment(self, a: Point2D, b: Point2D) -> f64 {
        let ab = b - a;
        let len2 = ab.length_squared();
        if len2 <= f64::EPSILON {
            return self.distance_to(&a);
        }
        let t = ((self - a).dot(ab) / len2).clamp(0.0, 1.0);
        self.distance_to(&(a + ab * t))
    }
}

impl Add for Point2D {
    type Output = Point2D;
    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2D {
    type Output = Point2D;
    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Point2D;
    fn mul(self, rhs: f64) -> Point2D {
        Point2D::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point2D {
    type Output = Point2D;
    fn div(self, rhs: f64) -> Point2D {
        Point2D::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point2D {
    type Output = Point2D;
    fn neg(self) -> Point2D {
        Point2D::new(-self.x, -self.y)
    }
}

impl std::fmt::Display for Point2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
