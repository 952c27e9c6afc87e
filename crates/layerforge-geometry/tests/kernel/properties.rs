//! Property-based tests for the CSG kernel.

use layerforge_core::Tolerances;
use layerforge_geometry::{CsgArena, CsgId, CsgPolygon, Point2D, Polygon, GAP_FLAG, SOLID_FLAG};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_point() -> impl Strategy<Value = Point2D> {
    (-30.0..30.0f64, -30.0..30.0f64).prop_map(|(x, y)| Point2D::new(x, y))
}

/// A counter-clockwise convex polygon: vertices on a circle, separated by
/// random angular gaps.
fn arb_convex() -> impl Strategy<Value = Polygon> {
    (3usize..=8).prop_flat_map(|n| {
        (
            prop::collection::vec(1.0..4.0f64, n),
            5.0..10.0f64,
            -10.0..10.0f64,
            -10.0..10.0f64,
        )
            .prop_map(|(gaps, radius, cx, cy)| {
                let total: f64 = gaps.iter().sum();
                let mut angle = 0.0f64;
                let mut points = Vec::with_capacity(gaps.len());
                for gap in &gaps {
                    points.push(Point2D::new(
                        cx + radius * angle.cos(),
                        cy + radius * angle.sin(),
                    ));
                    angle += std::f64::consts::TAU * gap / total;
                }
                Polygon::from_points(points, SOLID_FLAG)
            })
    })
}

/// A star-shaped, usually non-convex polygon: vertices at even angles
/// around the centre, each at its own radius.
fn arb_star() -> impl Strategy<Value = Polygon> {
    (3usize..=8).prop_flat_map(|tips| {
        (
            prop::collection::vec(2.0..10.0f64, tips * 2),
            -10.0..10.0f64,
            -10.0..10.0f64,
        )
            .prop_map(|(radii, cx, cy)| {
                let n = radii.len() as f64;
                let points = radii.iter().enumerate().map(|(i, r)| {
                    let angle = std::f64::consts::TAU * i as f64 / n;
                    Point2D::new(cx + r * angle.cos(), cy + r * angle.sin())
                });
                Polygon::from_points(points, SOLID_FLAG)
            })
    })
}

/// A small loop with mixed flags and some very short edges.
fn arb_flagged_loop() -> impl Strategy<Value = Polygon> {
    prop::collection::vec(
        (arb_point(), prop::bool::weighted(0.3), prop::bool::ANY),
        2..20,
    )
    .prop_map(|items| {
        let mut polygon = Polygon::new();
        let mut last = Point2D::ORIGIN;
        for (p, solid, nudge) in items {
            // Nudged points land right next to their predecessor
            let point = if nudge && !polygon.is_empty() {
                last + Point2D::new(1e-4, 0.0)
            } else {
                p
            };
            polygon.add(point, if solid { SOLID_FLAG } else { GAP_FLAG });
            last = point;
        }
        polygon
    })
}

fn arena() -> CsgArena {
    CsgArena::new(Tolerances::default())
}

/// `n` x `n` sample points covering the polygon's box and a margin around it.
fn sample_grid(polygon: &Polygon, n: usize) -> Vec<Point2D> {
    let b = polygon.bounds();
    let (x0, y0) = (b.x.low - 1.0, b.y.low - 1.0);
    let (w, h) = (b.x.length() + 2.0, b.y.length() + 2.0);
    let step = |i: usize| (i as f64 + 0.5) / n as f64;
    (0..n)
        .flat_map(|i| (0..n).map(move |j| Point2D::new(x0 + w * step(i), y0 + h * step(j))))
        .collect()
}

fn divided(arena: &mut CsgArena, polygon: &Polygon) -> CsgPolygon {
    let tol = *arena.tolerances();
    let csg = polygon.to_csg(arena);
    let mut region = CsgPolygon::new(csg, polygon.bounds());
    region.divide(arena, tol.resolution_squared(), tol.swell);
    region
}

fn distance_to_border(v: Point2D, border: &Polygon) -> f64 {
    border
        .edges()
        .map(|(a, b, _)| v.distance_to_segment(a, b))
        .fold(f64::INFINITY, f64::min)
}

// =============================================================================
// Property Tests: Boolean Algebra
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The complement negates the value everywhere and complementing twice
    /// gives back the same node.
    #[test]
    fn complement_negates_value(polygon in arb_star()) {
        let mut arena = arena();
        let a = polygon.to_csg(&mut arena);
        let c = arena.complement(a);

        for p in sample_grid(&polygon, 32) {
            prop_assert!((arena.value(c, p) + arena.value(a, p)).abs() < 1e-9);
            let on_boundary = arena.value(a, p).abs() < 1e-12;
            prop_assert!(on_boundary || arena.contains(a, p) != arena.contains(c, p));
        }
        prop_assert_eq!(arena.complement(c), a);
    }

    /// Identity laws collapse without building new nodes.
    #[test]
    fn identity_laws_hold(polygon in arb_convex(), p in arb_point()) {
        let mut arena = arena();
        let a = polygon.to_csg(&mut arena);

        prop_assert_eq!(arena.union(a, a), a);
        prop_assert_eq!(arena.union(a, CsgId::NULL), a);
        prop_assert_eq!(arena.intersection(a, CsgId::UNIVERSE), a);
        prop_assert_eq!(arena.intersection(a, CsgId::NULL), CsgId::NULL);

        let not_a = arena.complement(a);
        let everything = arena.union(a, not_a);
        prop_assert!(arena.value(everything, p) <= 0.0);
    }

    /// Offsetting moves every boundary by the same distance, so the value
    /// shifts by exactly that distance.
    #[test]
    fn offset_shifts_value(polygon in arb_convex(), p in arb_point(), d in -2.0..2.0f64) {
        let mut arena = arena();
        let a = polygon.to_csg(&mut arena);
        let moved = arena.offset(a, d);

        prop_assert!((arena.value(moved, p) - (arena.value(a, p) - d)).abs() < 1e-9);
        if d < 0.0 && arena.value(moved, p) < -1e-9 {
            prop_assert!(arena.contains(a, p));
        }
    }
}

// =============================================================================
// Property Tests: Polygons
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Removing short gap edges reaches a fixpoint in one call.
    #[test]
    fn filter_shorts_is_idempotent(polygon in arb_flagged_loop()) {
        let tiny = 1e-3;
        if let Some(once) = polygon.filter_shorts(tiny) {
            prop_assert!(once.len() <= polygon.len());
            prop_assert!(once.flags().contains(&SOLID_FLAG));
            prop_assert_eq!(once.filter_shorts(tiny), Some(once.clone()));
        }
    }

    /// A convex loop survives decomposition, subdivision and border tracing.
    #[test]
    fn convex_loop_round_trips(polygon in arb_convex()) {
        let mut arena = arena();
        let region = divided(&mut arena, &polygon);
        let tol = *arena.tolerances();

        let border = region.border(&arena, SOLID_FLAG);
        prop_assert_eq!(border.len(), 1);
        let traced = &border.polygons()[0];
        let expected = polygon.area();
        prop_assert!((traced.signed_area() - expected).abs() <= 1e-6 * expected);

        for &v in polygon.points() {
            let d = distance_to_border(v, traced);
            prop_assert!(d <= tol.point_resolution, "vertex {} is {} off the border", v, d);
        }
    }

    /// The border of a star passes through every one of its vertices,
    /// reflex ones included.
    #[test]
    fn star_border_meets_every_vertex(polygon in arb_star()) {
        let mut arena = arena();
        let region = divided(&mut arena, &polygon);
        let tol = *arena.tolerances();

        let border = region.border(&arena, SOLID_FLAG);
        prop_assert_eq!(border.len(), 1);
        let traced = &border.polygons()[0];
        for &v in polygon.points() {
            let d = distance_to_border(v, traced);
            prop_assert!(d <= tol.point_resolution, "vertex {} is {} off the border", v, d);
        }
    }

    /// Hatching never prints across a void: every printed stretch stays
    /// inside the region along its whole length.
    #[test]
    fn star_hatch_stays_inside(
        polygon in arb_star(),
        angle in 0.0..std::f64::consts::PI,
        spacing in 0.3..1.5f64,
    ) {
        let mut arena = arena();
        let csg = polygon.to_csg(&mut arena);
        let region = divided(&mut arena, &polygon);
        let tol = *arena.tolerances();

        let direction = Point2D::new(angle.cos(), angle.sin());
        let hatch = region.hatch(&arena, direction, spacing, SOLID_FLAG, GAP_FLAG);
        for chain in &hatch {
            for pair in chain.points().chunks(2) {
                for f in [0.25, 0.5, 0.75] {
                    let p = pair[0].lerp(pair[1], f);
                    let v = arena.value(csg, p);
                    prop_assert!(
                        v <= tol.point_resolution,
                        "stretch {} -> {} leaves the region at {} (value {})",
                        pair[0], pair[1], p, v
                    );
                }
            }
        }
    }
}
