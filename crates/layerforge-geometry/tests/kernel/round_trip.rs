use layerforge_core::Tolerances;
use layerforge_geometry::{CsgArena, CsgPolygon, Point2D, Polygon, SOLID_FLAG};

fn polygon(coords: &[(f64, f64)]) -> Polygon {
    Polygon::from_points(coords.iter().map(|&(x, y)| Point2D::new(x, y)), SOLID_FLAG)
}

fn star(tips: usize, outer: f64, inner: f64) -> Polygon {
    let points = (0..tips * 2).map(|i| {
        let r = if i % 2 == 0 { outer } else { inner };
        let a = std::f64::consts::PI * i as f64 / tips as f64;
        Point2D::new(r * a.cos(), r * a.sin())
    });
    Polygon::from_points(points, SOLID_FLAG)
}

/// Decompose, subdivide and trace the border back out.
fn round_trip(original: &Polygon) -> Vec<Polygon> {
    let tol = Tolerances::default();
    let mut arena = CsgArena::new(tol);
    let csg = original.to_csg(&mut arena);
    let mut region = CsgPolygon::new(csg, original.bounds());
    region.divide(&mut arena, tol.resolution_squared(), tol.swell);
    region.border(&arena, SOLID_FLAG).into_iter().collect()
}

fn assert_round_trip(original: &Polygon) {
    let tol = Tolerances::default();
    let loops = round_trip(original);
    assert_eq!(loops.len(), 1, "expected a single loop");
    let traced = &loops[0];

    let expected = original.area();
    assert!(
        (traced.signed_area() - expected).abs() <= 1e-6 * expected.max(1.0),
        "area {} vs {}",
        traced.signed_area(),
        expected
    );

    for &v in original.points() {
        let d = traced
            .edges()
            .map(|(a, b, _)| v.distance_to_segment(a, b))
            .fold(f64::INFINITY, f64::min);
        assert!(d <= tol.point_resolution, "vertex {} is {} off the border", v, d);
    }
}

#[test]
fn test_round_trip_square() {
    assert_round_trip(&polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]));
}

#[test]
fn test_round_trip_clockwise_triangle() {
    let triangle = polygon(&[(0.0, 0.0), (3.0, 8.0), (9.0, 1.0)]);
    assert!(triangle.signed_area() < 0.0);
    // Traced loops always come back counter-clockwise
    assert_round_trip(&triangle);
}

#[test]
fn test_round_trip_l_shape() {
    assert_round_trip(&polygon(&[
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 4.0),
        (4.0, 4.0),
        (4.0, 10.0),
        (0.0, 10.0),
    ]));
}

#[test]
fn test_round_trip_notch() {
    assert_round_trip(&polygon(&[
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 10.0),
        (6.0, 10.0),
        (5.0, 5.0),
        (4.0, 10.0),
        (0.0, 10.0),
    ]));
}

#[test]
fn test_round_trip_comb() {
    // Three teeth: pockets nested only one level deep but side by side
    assert_round_trip(&polygon(&[
        (0.0, 0.0),
        (12.0, 0.0),
        (12.0, 8.0),
        (10.0, 8.0),
        (10.0, 3.0),
        (7.0, 3.0),
        (7.0, 8.0),
        (5.0, 8.0),
        (5.0, 3.0),
        (2.0, 3.0),
        (2.0, 8.0),
        (0.0, 8.0),
    ]));
}

#[test]
fn test_round_trip_star() {
    assert_round_trip(&star(5, 10.0, 4.0));
}
