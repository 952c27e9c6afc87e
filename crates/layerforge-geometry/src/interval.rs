//! 1D closed intervals and interval arithmetic.
//!
//! Intervals serve two purposes in the kernel: parameter ranges along a
//! line, and conservative bounds of a half-plane (or CSG) value over a box.
//!
//! - If `value.is_positive()`: the whole box is outside
//! - If `value.is_negative()`: the whole box is inside
//! - Otherwise: the boundary may pass through the box

use std::ops::{Add, Mul};

/// A closed interval `[low, high]`, or empty.
///
/// The empty interval is stored as `low > high`; every constructor keeps
/// `low <= high` for non-empty values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
}

impl Interval {
    pub const EMPTY: Interval = Interval {
        low: f64::INFINITY,
        high: f64::NEG_INFINITY,
    };

    /// The entire real line
    pub const ALL: Interval = Interval {
        low: f64::NEG_INFINITY,
        high: f64::INFINITY,
    };

    /// Interval spanning `a` and `b` in either order.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Degenerate interval `[v, v]`
    pub fn point(v: f64) -> Self {
        Self { low: v, high: v }
    }

    pub fn is_empty(&self) -> bool {
        !(self.low <= self.high)
    }

    /// Zero for the empty interval.
    pub fn length(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.high - self.low
        }
    }

    pub fn mid(&self) -> f64 {
        0.5 * (self.low + self.high)
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.low && v <= self.high
    }

    pub fn intersect(&self, other: &Interval) -> Interval {
        let low = self.low.max(other.low);
        let high = self.high.min(other.high);
        if low <= high {
            Interval { low, high }
        } else {
            Interval::EMPTY
        }
    }

    /// Smallest interval containing both.
    pub fn union(&self, other: &Interval) -> Interval {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Interval {
            low: self.low.min(other.low),
            high: self.high.max(other.high),
        }
    }

    /// Grow to include `v`.
    pub fn expand_to(&self, v: f64) -> Interval {
        self.union(&Interval::point(v))
    }

    /// Pointwise minimum, the interval image of `min(a, b)`.
    pub fn min(&self, other: &Interval) -> Interval {
        Interval {
            low: self.low.min(other.low),
            high: self.high.min(other.high),
        }
    }

    /// Pointwise maximum, the interval image of `max(a, b)`.
    pub fn max(&self, other: &Interval) -> Interval {
        Interval {
            low: self.low.max(other.low),
            high: self.high.max(other.high),
        }
    }

    /// Entirely above zero.
    pub fn is_positive(&self) -> bool {
        self.low > 0.0
    }

    /// Entirely below zero.
    pub fn is_negative(&self) -> bool {
        self.high < 0.0
    }
}

impl Add for Interval {
    type Output = Interval;
    fn add(self, rhs: Interval) -> Interval {
        if self.is_empty() || rhs.is_empty() {
            return Interval::EMPTY;
        }
        Interval {
            low: self.low + rhs.low,
            high: self.high + rhs.high,
        }
    }
}

impl Add<f64> for Interval {
    type Output = Interval;
    fn add(self, rhs: f64) -> Interval {
        if self.is_empty() {
            return self;
        }
        Interval {
            low: self.low + rhs,
            high: self.high + rhs,
        }
    }
}

impl Mul<f64> for Interval {
    type Output = Interval;
    fn mul(self, rhs: f64) -> Interval {
        if self.is_empty() {
            return self;
        }
        if rhs == 0.0 {
            return Interval::point(0.0);
        }
        Interval::new(self.low * rhs, self.high * rhs)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "[empty]")
        } else {
            write!(f, "[{}, {}]", self.low, self.high)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_interval() {
        assert!(Interval::EMPTY.is_empty());
        assert!(!Interval::ALL.is_empty());
        assert_eq!(Interval::EMPTY.length(), 0.0);
        let a = Interval::new(0.0, 1.0);
        assert!(a.intersect(&Interval::new(2.0, 3.0)).is_empty());
        assert_eq!(a.union(&Interval::EMPTY), a);
        assert!((Interval::EMPTY + a).is_empty());
    }

    #[test]
    fn test_new_orders_bounds() {
        let a = Interval::new(3.0, -1.0);
        assert_eq!(a.low, -1.0);
        assert_eq!(a.high, 3.0);
        assert_eq!(a.mid(), 1.0);
    }

    #[test]
    fn test_arithmetic() {
        let a = Interval::new(1.0, 2.0);
        assert_eq!(a * -2.0, Interval::new(-4.0, -2.0));
        assert_eq!(a + Interval::new(-1.0, 1.0), Interval::new(0.0, 3.0));
        assert_eq!(a + 1.0, Interval::new(2.0, 3.0));
        assert_eq!(a * 0.0, Interval::point(0.0));
    }

    #[test]
    fn test_sign_tests() {
        assert!(Interval::new(0.5, 2.0).is_positive());
        assert!(Interval::new(-2.0, -0.5).is_negative());
        let straddle = Interval::new(-1.0, 1.0);
        assert!(!straddle.is_positive() && !straddle.is_negative());
    }

    #[test]
    fn test_min_max() {
        let a = Interval::new(0.0, 4.0);
        let b = Interval::new(1.0, 2.0);
        assert_eq!(a.min(&b), Interval::new(0.0, 2.0));
        assert_eq!(a.max(&b), Interval::new(1.0, 4.0));
    }
}
