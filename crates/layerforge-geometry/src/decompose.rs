//! Simple polygon to CSG conversion (Tang & Woo convex-hull decomposition).
//!
//! The polygon is the convex hull of its points minus the pockets between
//! the hull and the boundary. Each pocket is itself a chain whose hull and
//! pockets are expressed one level deeper, alternating intersection (odd
//! levels) and union (even levels):
//!
//! ```text
//! level 1:  real hull edges  &  pocket lids  &  pocket expressions
//! level 2:  real hull edges  |  pocket lids  |  pocket expressions
//! ...
//! ```
//!
//! Every half-plane is built from consecutive points in polygon order, so
//! inside is always to the left and no plane is ever negated. The closing
//! chord of a pocket chain is the parent's lid and is not repeated.

use crate::csg::{CsgArena, CsgId};
use crate::half_plane::HalfPlane;
use crate::point::Point2D;
use layerforge_core::Tolerances;
use tracing::{debug, error, warn};

/// Deeper nesting than this is treated as a runaway recursion.
const MAX_LEVEL: usize = 64;

/// Signed area of a closed loop, positive when counter-clockwise.
pub fn signed_area(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let sum: f64 = (0..n)
        .map(|i| points[i].cross(points[(i + 1) % n]))
        .sum();
    0.5 * sum
}

/// CSG expression for the interior of a simple polygon loop. Orientation of
/// the input does not matter. Degenerate loops (fewer than three distinct
/// points, or no area) are logged and give `CsgId::NULL`.
pub fn decompose(arena: &mut CsgArena, points: &[Point2D]) -> CsgId {
    let tol = *arena.tolerances();
    let mut loop_points = clean_loop(points, &tol);

    if loop_points.len() < 3 {
        error!(
            "cannot decompose polygon: {} usable points of {}",
            loop_points.len(),
            points.len()
        );
        return CsgId::NULL;
    }

    let area = signed_area(&loop_points);
    if area.abs() <= tol.tiny {
        error!("cannot decompose polygon: zero area");
        return CsgId::NULL;
    }
    if area < 0.0 {
        loop_points.reverse();
    }

    let result = decompose_chain(arena, &loop_points, true, 1);
    debug!(
        "decomposed {} points into {} leaves",
        loop_points.len(),
        arena.complexity(result)
    );
    result
}

/// Drop repeated points and points lying on the segment between their
/// neighbours.
fn clean_loop(points: &[Point2D], tol: &Tolerances) -> Vec<Point2D> {
    let mut out: Vec<Point2D> = Vec::with_capacity(points.len());
    for &p in points {
        if !p.x.is_finite() || !p.y.is_finite() {
            warn!("skipping non-finite polygon point {}", p);
            continue;
        }
        if out
            .last()
            .is_some_and(|q| q.distance_to(&p) <= tol.point_resolution)
        {
            continue;
        }
        out.push(p);
    }
    while out.len() > 1 {
        let (first, last) = (out[0], out[out.len() - 1]);
        if first.distance_to(&last) <= tol.point_resolution {
            out.pop();
        } else {
            break;
        }
    }

    let mut changed = true;
    while changed && out.len() >= 3 {
        changed = false;
        let n = out.len();
        for i in 0..n {
            let prev = out[(i + n - 1) % n];
            let next = out[(i + 1) % n];
            if out[i].distance_to_segment(prev, next) <= tol.tiny {
                out.remove(i);
                changed = true;
                break;
            }
        }
    }
    out
}

/// How one stretch of a chain between consecutive hull points is treated.
#[derive(Debug, Clone, Copy)]
enum HullSegment {
    /// The two hull points are neighbours on the chain
    Real { from: usize, to: usize },
    /// Chain points between them lie strictly inside the hull
    Pocket { from: usize, to: usize },
}

impl HullSegment {
    fn ends(self) -> (usize, usize) {
        match self {
            HullSegment::Real { from, to } | HullSegment::Pocket { from, to } => (from, to),
        }
    }
}

fn decompose_chain(arena: &mut CsgArena, chain: &[Point2D], closed: bool, level: usize) -> CsgId {
    if level > MAX_LEVEL {
        error!("hull decomposition nested deeper than {} levels", MAX_LEVEL);
        return CsgId::NULL;
    }
    let tol = *arena.tolerances();
    let n = chain.len();

    let hull = convex_hull(chain, tol.tiny);
    if hull.len() < 3 {
        error!(
            "degenerate hull at level {}: {} vertices from {} points",
            level,
            hull.len(),
            n
        );
        return CsgId::NULL;
    }
    let hull_points: Vec<Point2D> = hull.iter().map(|&i| chain[i]).collect();

    let on_hull: Vec<usize> = (0..n)
        .filter(|&i| {
            (!closed && (i == 0 || i == n - 1))
                || on_boundary(chain[i], &hull_points, tol.point_resolution)
        })
        .collect();

    let mut segments: Vec<HullSegment> = on_hull
        .windows(2)
        .map(|w| classify(w[0], w[1], n))
        .collect();
    if closed {
        if let (Some(&last), Some(&first)) = (on_hull.last(), on_hull.first()) {
            segments.push(classify(last, first, n));
        }
    }

    let mut terms: Vec<CsgId> = Vec::with_capacity(segments.len() * 2);
    let mut leaf_planes: Vec<HalfPlane> = Vec::new();

    for (k, segment) in segments.iter().enumerate() {
        match *segment {
            HullSegment::Real { from, to } => {
                if let Some(plane) = HalfPlane::from_points(chain[from], chain[to]) {
                    push_leaf(arena, &mut terms, &mut leaf_planes, plane, &tol);
                }
            }
            HullSegment::Pocket { from, to } => {
                if let Some(lid) = HalfPlane::from_points(chain[from], chain[to]) {
                    if !lid_is_redundant(&segments, k, closed, chain, &lid, &tol) {
                        push_leaf(arena, &mut terms, &mut leaf_planes, lid, &tol);
                    }
                }
                let span = if to > from { to - from } else { to + n - from };
                let pocket: Vec<Point2D> = (0..=span).map(|s| chain[(from + s) % n]).collect();
                let inner = decompose_chain(arena, &pocket, false, level + 1);
                terms.push(inner);
            }
        }
    }

    if level % 2 == 1 {
        arena.intersection_all(terms)
    } else {
        arena.union_all(terms)
    }
}

fn classify(from: usize, to: usize, n: usize) -> HullSegment {
    if (from + 1) % n == to {
        HullSegment::Real { from, to }
    } else {
        HullSegment::Pocket { from, to }
    }
}

/// Add a leaf unless an identical plane is already one of this level's terms.
fn push_leaf(
    arena: &mut CsgArena,
    terms: &mut Vec<CsgId>,
    seen: &mut Vec<HalfPlane>,
    plane: HalfPlane,
    tol: &Tolerances,
) {
    if seen.iter().any(|s| s.same(&plane, tol)) {
        return;
    }
    seen.push(plane.clone());
    terms.push(arena.leaf(plane));
}

/// A lid is already present when a real hull edge next to it runs along the
/// same line in the same direction.
fn lid_is_redundant(
    segments: &[HullSegment],
    k: usize,
    closed: bool,
    chain: &[Point2D],
    lid: &HalfPlane,
    tol: &Tolerances,
) -> bool {
    let count = segments.len();
    let mut neighbours = Vec::with_capacity(2);
    if k > 0 {
        neighbours.push(segments[k - 1]);
    } else if closed && count > 1 {
        neighbours.push(segments[count - 1]);
    }
    if k + 1 < count {
        neighbours.push(segments[k + 1]);
    } else if closed && count > 1 {
        neighbours.push(segments[0]);
    }

    neighbours.into_iter().any(|segment| match segment {
        HullSegment::Real { .. } => {
            let (from, to) = segment.ends();
            HalfPlane::from_points(chain[from], chain[to]).is_some_and(|p| p.same(lid, tol))
        }
        HullSegment::Pocket { .. } => false,
    })
}

fn on_boundary(p: Point2D, hull: &[Point2D], tol: f64) -> bool {
    let m = hull.len();
    (0..m).any(|i| p.distance_to_segment(hull[i], hull[(i + 1) % m]) <= tol)
}

/// Counter-clockwise convex hull vertex indices, by recursive farthest-point
/// insertion between the lowest and highest points. Points on a hull edge
/// are not vertices.
pub fn convex_hull(points: &[Point2D], tiny: f64) -> Vec<usize> {
    if points.is_empty() {
        return Vec::new();
    }
    let key = |i: &usize| (points[*i].y, points[*i].x);
    let all: Vec<usize> = (0..points.len()).collect();
    let lowest = all
        .iter()
        .copied()
        .min_by(|a, b| key(a).partial_cmp(&key(b)).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or(0);
    let highest = all
        .iter()
        .copied()
        .max_by(|a, b| key(a).partial_cmp(&key(b)).unwrap_or(std::cmp::Ordering::Equal))
        .unwrap_or(0);

    if points[lowest].distance_squared_to(&points[highest]) <= tiny * tiny {
        return vec![lowest];
    }

    let east: Vec<usize> = all
        .iter()
        .copied()
        .filter(|&i| side(points, lowest, highest, i) < -tiny)
        .collect();
    let west: Vec<usize> = all
        .iter()
        .copied()
        .filter(|&i| side(points, highest, lowest, i) < -tiny)
        .collect();

    let mut hull = vec![lowest];
    expand(points, lowest, highest, &east, tiny, &mut hull);
    hull.push(highest);
    expand(points, highest, lowest, &west, tiny, &mut hull);
    hull
}

/// Cross product of `a -> b` with `a -> p`, scaled to a distance; negative
/// when `p` is to the right.
fn side(points: &[Point2D], a: usize, b: usize, p: usize) -> f64 {
    let ab = points[b] - points[a];
    let len = ab.length();
    if len == 0.0 {
        return 0.0;
    }
    ab.cross(points[p] - points[a]) / len
}

fn expand(points: &[Point2D], a: usize, b: usize, candidates: &[usize], tiny: f64, hull: &mut Vec<usize>) {
    let farthest = candidates
        .iter()
        .copied()
        .min_by(|&x, &y| {
            side(points, a, b, x)
                .partial_cmp(&side(points, a, b, y))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    let Some(f) = farthest else {
        return;
    };
    if side(points, a, b, f) >= -tiny {
        return;
    }

    let before: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&i| side(points, a, f, i) < -tiny)
        .collect();
    let after: Vec<usize> = candidates
        .iter()
        .copied()
        .filter(|&i| side(points, f, b, i) < -tiny)
        .collect();

    expand(points, a, f, &before, tiny, hull);
    hull.push(f);
    expand(points, f, b, &after, tiny, hull);
}
