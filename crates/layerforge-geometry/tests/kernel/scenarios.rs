use layerforge_core::Tolerances;
use layerforge_geometry::{
    BoundingBox, CsgArena, CsgPolygon, Point2D, Polygon, PolygonList, GAP_FLAG, SOLID_FLAG,
};

fn square(lo: f64, hi: f64) -> Polygon {
    Polygon::from_points(
        [
            Point2D::new(lo, lo),
            Point2D::new(hi, lo),
            Point2D::new(hi, hi),
            Point2D::new(lo, hi),
        ],
        SOLID_FLAG,
    )
}

fn region(arena: &mut CsgArena, polygon: &Polygon) -> CsgPolygon {
    let csg = polygon.to_csg(arena);
    CsgPolygon::new(csg, polygon.bounds())
}

fn inset(arena: &mut CsgArena, base: &CsgPolygon, d: f64) -> CsgPolygon {
    let mut shrunk = base.offset(arena, d);
    let res2 = arena.tolerances().resolution_squared();
    let swell = arena.tolerances().swell;
    shrunk.divide(arena, res2, swell);
    shrunk
}

fn distance_to_loop(p: Point2D, polygon: &Polygon) -> f64 {
    polygon
        .edges()
        .map(|(a, b, _)| p.distance_to_segment(a, b))
        .fold(f64::INFINITY, f64::min)
}

#[test]
fn test_square_border_and_hatch() {
    let mut arena = CsgArena::new(Tolerances::default());
    let base = region(&mut arena, &square(0.0, 10.0));
    let extrusion = 0.5;

    let border_region = inset(&mut arena, &base, -0.5 * extrusion);
    let border = border_region.border(&arena, SOLID_FLAG);
    assert_eq!(border.len(), 1);
    let outline = &border.polygons()[0];
    assert_eq!(outline.len(), 4);
    let b = outline.bounds();
    assert!((b.x.low - 0.25).abs() < 1e-9 && (b.x.high - 9.75).abs() < 1e-9);
    assert!((b.y.low - 0.25).abs() < 1e-9 && (b.y.high - 9.75).abs() < 1e-9);

    let hatch_region = inset(&mut arena, &base, -1.5 * extrusion);
    let hatch = hatch_region.hatch(&arena, Point2D::new(1.0, 0.0), 1.0, SOLID_FLAG, GAP_FLAG);
    let stretches: Vec<(Point2D, Point2D)> = hatch
        .iter()
        .flat_map(|chain| {
            chain
                .points()
                .chunks(2)
                .map(|pair| (pair[0], pair[1]))
                .collect::<Vec<_>>()
        })
        .collect();

    assert_eq!(stretches.len(), 9);
    let mut ys: Vec<f64> = stretches.iter().map(|(a, _)| a.y).collect();
    ys.sort_by(f64::total_cmp);
    for (i, y) in ys.iter().enumerate() {
        assert!((y - (i + 1) as f64).abs() < 1e-9);
    }
    for (a, b) in &stretches {
        assert!((a.y - b.y).abs() < 1e-12);
        assert!((a.x.min(b.x) - 0.75).abs() < 1e-9);
        assert!((a.x.max(b.x) - 9.25).abs() < 1e-9);
    }
    for chain in &hatch {
        for (i, &flag) in chain.flags().iter().enumerate() {
            let expected = if i % 2 == 0 { SOLID_FLAG } else { GAP_FLAG };
            assert_eq!(flag, expected);
        }
    }
}

#[test]
fn test_annulus_resolve_insides() {
    let mut arena = CsgArena::new(Tolerances::default());
    let list: PolygonList = [square(0.0, 20.0), square(5.0, 15.0)].into_iter().collect();
    let annulus = list.resolve_insides(&mut arena);

    for (x, y) in [(10.0, 10.0), (6.0, 6.0), (14.0, 10.0)] {
        assert!(arena.value(annulus, Point2D::new(x, y)) > 0.0, "hole at {x},{y}");
    }
    for (x, y) in [(2.0, 2.0), (10.0, 2.5), (17.5, 17.5), (2.5, 12.0)] {
        assert!(arena.value(annulus, Point2D::new(x, y)) < 0.0, "material at {x},{y}");
    }
    assert!(arena.value(annulus, Point2D::new(21.0, 10.0)) > 0.0);
}

#[test]
fn test_side_by_side_islands_trace_separately() {
    let rect = |x0: f64, x1: f64| {
        Polygon::from_points(
            [
                Point2D::new(x0, 0.0),
                Point2D::new(x1, 0.0),
                Point2D::new(x1, 4.0),
                Point2D::new(x0, 4.0),
            ],
            SOLID_FLAG,
        )
    };
    // Both bottom edges (and both top edges) lie on one line
    let list: PolygonList = [rect(0.0, 4.0), rect(6.0, 10.0)].into_iter().collect();
    let mut arena = CsgArena::new(Tolerances::default());
    let csg = list.resolve_insides(&mut arena);
    let mut islands = CsgPolygon::new(csg, list.bounds());
    let res2 = arena.tolerances().resolution_squared();
    let swell = arena.tolerances().swell;
    islands.divide(&mut arena, res2, swell);

    let border = islands.border(&arena, SOLID_FLAG);
    assert_eq!(border.len(), 2);
    for outline in &border {
        assert!((outline.signed_area() - 16.0).abs() < 1e-6);
    }
    for source in &list {
        let traced = border
            .iter()
            .find(|o| o.bounds().intersect(&source.bounds()).area() > 1.0)
            .expect("island traced");
        for &v in source.points() {
            assert!(distance_to_loop(v, traced) <= arena.tolerances().point_resolution);
        }
    }

    let hatch = islands.hatch(&arena, Point2D::new(1.0, 0.0), 1.0, SOLID_FLAG, GAP_FLAG);
    for chain in &hatch {
        for pair in chain.points().chunks(2) {
            let mid = pair[0].lerp(pair[1], 0.5);
            assert!(!(4.0 + 1e-6..6.0 - 1e-6).contains(&mid.x), "hatch bridges the gap");
        }
    }
}

#[test]
fn test_annulus_border_has_outer_and_hole_loops() {
    let mut arena = CsgArena::new(Tolerances::default());
    let list: PolygonList = [square(0.0, 20.0), square(5.0, 15.0)].into_iter().collect();
    let annulus = list.resolve_insides(&mut arena);
    let base = CsgPolygon::new(annulus, list.bounds());

    let border = inset(&mut arena, &base, -0.25).border(&arena, SOLID_FLAG);
    assert_eq!(border.len(), 2);

    let mut areas: Vec<f64> = border.iter().map(Polygon::signed_area).collect();
    areas.sort_by(f64::total_cmp);
    // The hole is traced clockwise and grows by the offset
    assert!((areas[0] + 10.5 * 10.5).abs() < 1e-6);
    assert!((areas[1] - 19.5 * 19.5).abs() < 1e-6);
}

fn assert_separated(lo: f64, hi: f64, extrusion: f64, spacing: f64) {
    let mut arena = CsgArena::new(Tolerances::default());
    let base = region(&mut arena, &square(lo, hi));

    let border = inset(&mut arena, &base, -0.5 * extrusion).border(&arena, SOLID_FLAG);
    assert_eq!(border.len(), 1);
    let outline = &border.polygons()[0];

    let hatch = inset(&mut arena, &base, -1.5 * extrusion).hatch(
        &arena,
        Point2D::new(1.0, 0.0),
        spacing,
        SOLID_FLAG,
        GAP_FLAG,
    );
    assert!(!hatch.is_empty());

    let outline_csg = outline.to_csg(&mut arena);
    for chain in &hatch {
        for pair in chain.points().chunks(2) {
            for p in [pair[0], pair[1], pair[0].midpoint(pair[1])] {
                assert!(arena.contains(outline_csg, p));
                assert!(distance_to_loop(p, outline) >= extrusion - 1e-6);
            }
        }
    }
}

#[test]
fn test_hatch_border_separation_unit_square() {
    assert_separated(0.0, 1.0, 0.3, 0.04);
}

#[test]
fn test_hatch_border_separation_large_square() {
    assert_separated(0.0, 10.0, 0.3, 0.6);
}

#[test]
fn test_fully_consumed_region_is_empty() {
    let mut arena = CsgArena::new(Tolerances::default());
    let base = region(&mut arena, &square(0.0, 1.0));
    let gone = inset(&mut arena, &base, -0.6);

    assert!(gone.border(&arena, SOLID_FLAG).is_empty());
    assert!(gone
        .hatch(&arena, Point2D::new(0.0, 1.0), 0.1, SOLID_FLAG, GAP_FLAG)
        .is_empty());
}

#[test]
fn test_edge_soup_to_region() {
    let p = Point2D::new;
    let edges = vec![
        (p(10.0, 0.0), p(10.0, 10.0)),
        (p(0.0, 10.0), p(0.0, 0.0)),
        (p(0.0, 0.0), p(10.0, 0.0)),
        (p(10.0, 10.0), p(0.0, 10.0)),
    ];
    let loops = PolygonList::from_edges(&edges, Tolerances::default().point_resolution);
    assert_eq!(loops.len(), 1);

    let mut arena = CsgArena::new(Tolerances::default());
    let csg = loops.resolve_insides(&mut arena);
    assert!(arena.contains(csg, p(5.0, 5.0)));
    assert!(!arena.contains(csg, p(15.0, 5.0)));
    assert_eq!(
        loops.bounds(),
        BoundingBox::from_corners(p(0.0, 0.0), p(10.0, 10.0))
    );
}
